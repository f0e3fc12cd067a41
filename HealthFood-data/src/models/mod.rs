//! Row models read from and written to the SQLite store.
//!
//! JSON columns are decoded into [`serde_json::Value`] on the way out so that
//! callers never see raw column text.

pub mod chat;
pub mod document;
pub mod food;
pub mod health_plan;
pub mod health_profile;
pub mod logs;
pub mod stats;
pub mod user;

pub use chat::*;
pub use document::*;
pub use food::*;
pub use health_plan::*;
pub use health_profile::*;
pub use logs::*;
pub use stats::*;
pub use user::*;
