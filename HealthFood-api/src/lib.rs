// HealthFood-api lib.rs
//
// HTTP layer of the HealthFood chatbot: request DTOs, handlers, routing and
// the OpenAPI document.

pub mod api;
pub mod entities;
pub mod openapi;

pub use api::{create_app, AppState, ServerConfig};
