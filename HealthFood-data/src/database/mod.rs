// Database modules
pub mod connection;
pub mod migrations;
pub mod seed;

// Re-export database connection functions
pub use connection::*;
pub use seed::seed_foods_from_csv;
