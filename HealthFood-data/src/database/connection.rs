//! Database connection module for the HealthFood application
//!
//! SQLite is the only supported backend. The server builds one process-wide
//! pool from environment configuration with [`initialize_database_pool`];
//! tests build private pools with [`create_in_memory_pool`].

use std::env;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use thiserror::Error;
use tracing::{error, info, warn};

use super::migrations::run_migrations;

/// Global database pool used by the server
static DB_POOL: OnceCell<DatabasePool> = OnceCell::new();

/// A pooled SQLite connection
pub type SqliteConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Shared SQLite connection pool
#[derive(Debug, Clone)]
pub struct DatabasePool(Arc<r2d2::Pool<SqliteConnectionManager>>);

impl DatabasePool {
    /// Check out a connection from the pool
    pub fn get(&self) -> Result<SqliteConnection, r2d2::Error> {
        self.0.get()
    }

    /// Current pool state as `(connections, idle_connections)`
    pub fn state(&self) -> (u32, u32) {
        let state = self.0.state();
        (state.connections, state.idle_connections)
    }
}

/// Database error
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// SQLite error
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    /// Connection pool error
    #[error("SQLite connection pool error: {0}")]
    PoolError(#[from] r2d2::Error),

    /// Unsupported database type
    #[error("Unsupported database type: {0}")]
    UnsupportedDatabaseType(String),

    /// Database pool already initialized
    #[error("Database pool is already initialized")]
    PoolAlreadyInitialized,

    /// Database pool not initialized
    #[error("Database pool is not initialized")]
    PoolNotInitialized,

    /// Migration error
    #[error("Database migration error: {0}")]
    MigrationError(String),

    /// Seed data error
    #[error("Seed data error: {0}")]
    SeedError(String),

    /// Filesystem error while preparing the database location
    #[error("Database I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub sqlite_path: String,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Connection checkout timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            sqlite_path: "data/healthfood.db".to_string(),
            max_connections: 10,
            timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// Create a new database configuration from environment variables
    pub fn from_env() -> Result<Self, DatabaseError> {
        let db_type = env::var("DB_TYPE").unwrap_or_else(|_| "sqlite".to_string());
        if !db_type.eq_ignore_ascii_case("sqlite") {
            return Err(DatabaseError::UnsupportedDatabaseType(db_type));
        }

        let defaults = Self::default();

        let sqlite_path = env::var("DB_SQLITE_PATH").unwrap_or(defaults.sqlite_path);

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.max_connections);

        let timeout_seconds = env::var("DB_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(defaults.timeout_seconds);

        info!(
            "Database configuration: path={}, max_connections={}, timeout={}s",
            sqlite_path, max_connections, timeout_seconds
        );

        Ok(Self {
            sqlite_path,
            max_connections,
            timeout_seconds,
        })
    }
}

/// Build the global pool from environment configuration and run migrations
pub fn initialize_database_pool() -> Result<DatabasePool, DatabaseError> {
    if DB_POOL.get().is_some() {
        return Err(DatabaseError::PoolAlreadyInitialized);
    }
    let config = DatabaseConfig::from_env()?;
    install_pool(create_pool(&config)?)
}

fn install_pool(pool: DatabasePool) -> Result<DatabasePool, DatabaseError> {
    DB_POOL
        .set(pool.clone())
        .map_err(|_| DatabaseError::PoolAlreadyInitialized)?;
    info!("Global database pool initialized");
    Ok(pool)
}

/// The pool stored by [`initialize_database_pool`]
pub fn get_db_pool() -> Result<DatabasePool, DatabaseError> {
    DB_POOL.get().cloned().ok_or(DatabaseError::PoolNotInitialized)
}

/// Enable foreign keys on every new connection so ON DELETE CASCADE applies
fn enable_foreign_keys(conn: &mut rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
}

/// Build a file-backed pool and run migrations on it
pub fn create_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    info!("Initializing SQLite database at: {}", config.sqlite_path);

    if let Some(parent) = Path::new(&config.sqlite_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating parent directory: {:?}", parent);
            std::fs::create_dir_all(parent)?;
        }
    }

    let manager = SqliteConnectionManager::file(&config.sqlite_path)
        .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE)
        .with_init(enable_foreign_keys);

    let pool = r2d2::Pool::builder()
        .max_size(config.max_connections)
        .connection_timeout(Duration::from_secs(config.timeout_seconds))
        .build(manager)
        .map_err(|e| {
            error!("Failed to create SQLite connection pool: {}", e);
            DatabaseError::PoolError(e)
        })?;

    let pool = DatabasePool(Arc::new(pool));
    migrate(&pool)?;

    info!("SQLite connection pool created successfully");
    Ok(pool)
}

/// Build a pool over a single in-memory connection.
///
/// Every `:memory:` connection is a separate database, so the pool is capped
/// at one connection that all callers share.
pub fn create_in_memory_pool() -> Result<DatabasePool, DatabaseError> {
    let manager = SqliteConnectionManager::memory().with_init(enable_foreign_keys);

    let pool = r2d2::Pool::builder()
        .max_size(1)
        .connection_timeout(Duration::from_secs(5))
        .build(manager)?;

    let pool = DatabasePool(Arc::new(pool));
    migrate(&pool)?;
    Ok(pool)
}

fn migrate(pool: &DatabasePool) -> Result<(), DatabaseError> {
    let mut conn = pool.get()?;
    run_migrations(&mut conn).map_err(DatabaseError::MigrationError)
}

/// Run a trivial query to confirm the database answers
pub fn check_connection(pool: &DatabasePool) -> Result<(), DatabaseError> {
    let conn = pool.get()?;
    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
    Ok(())
}

/// Human-readable summary of the pool for diagnostics
pub fn get_connection_info(pool: &DatabasePool) -> String {
    let (connections, idle) = pool.state();
    match check_connection(pool) {
        Ok(()) => format!("SQLite ({} connections, {} idle)", connections, idle),
        Err(e) => {
            warn!("Database connectivity check failed: {}", e);
            format!("SQLite (unreachable: {})", e)
        }
    }
}
