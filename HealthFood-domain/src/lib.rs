// HealthFood Domain
// Business logic for the HealthFood chatbot: accounts, profiles, documents,
// chat with tool calls, foods and health plans

// Settings read from the environment
pub mod config;

// Service-level errors
pub mod errors;

// Authentication
pub mod auth;

// AI chat completion client and tool loop
pub mod ai;

// Hosted text-to-speech and speech-to-text
pub mod speech;

// PDF text extraction
pub mod pdf;

// Domain entities
pub mod entities;

// Services that implement business logic
pub mod services;

// Health checks and system status
pub mod health;

// Re-export the database module from health_food_data for convenience
pub use health_food_data::database;

// Testing utilities - only available with mock feature
#[cfg(feature = "mock")]
pub mod testing;
