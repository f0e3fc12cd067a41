pub mod auth;
pub mod chat;
pub mod documents;
pub mod foods;
pub mod health;
pub mod logs;
pub mod plans;
pub mod profiles;
pub mod speech;

pub use health::{health_check, initialize_server_start_time};
