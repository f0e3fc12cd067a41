// HealthFood Data
// Storage layer: SQLite connection pool, schema, seed data and repositories

// Database connection management
pub mod database;

// Repository implementations for data access
pub mod repository;

// Row models returned by repositories
pub mod models;
