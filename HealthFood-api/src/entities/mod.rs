// Public entities for the HealthFood API
// Request payloads accepted at the HTTP boundary, converted into domain inputs

// Common entities for error handling and acknowledgements
pub mod common;

// Auth entities
pub mod auth;

pub mod chat;
pub mod documents;
pub mod foods;
pub mod plans;
pub mod profiles;
pub mod speech;
