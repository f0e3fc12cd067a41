// Database migrations module
mod sqlite;

pub use sqlite::{run_migrations, SCHEMA_VERSION};
