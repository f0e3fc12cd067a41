// Repository module structure
pub mod errors;
mod columns;
mod chat;
mod document;
mod food;
mod health_plan;
mod health_profile;
mod logs;
mod stats;
mod user;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use chat::{ChatRepository, ChatRepositoryTrait};
pub use document::{DocumentRepository, DocumentRepositoryTrait};
pub use food::{FoodRepository, FoodRepositoryTrait};
pub use health_plan::{HealthPlanRepository, HealthPlanRepositoryTrait};
pub use health_profile::{HealthProfileRepository, HealthProfileRepositoryTrait};
pub use logs::{LogRepository, LogRepositoryTrait};
pub use stats::{StatsRepository, StatsRepositoryTrait};
pub use user::{normalize_email, UserRepository, UserRepositoryTrait};

/// Helpers for tests that need a migrated database
#[cfg(any(test, feature = "mock"))]
pub mod testing {
    use rusqlite::params;

    use super::columns::now;
    use crate::database::{create_in_memory_pool, DatabasePool};

    /// Fresh migrated in-memory pool
    pub fn test_pool() -> DatabasePool {
        create_in_memory_pool().expect("in-memory pool")
    }

    /// Insert an active user and return its id
    pub fn insert_user(pool: &DatabasePool, email: &str) -> i64 {
        let conn = pool.get().expect("connection");
        let ts = now();
        conn.execute(
            "INSERT INTO users (email, password_hash, full_name, role, created_at, updated_at)
             VALUES (?1, 'hash', 'Test User', 'user', ?2, ?2)",
            params![email, ts],
        )
        .expect("insert user");
        conn.last_insert_rowid()
    }

    /// Insert a bare profile for a user and return its id
    pub fn insert_profile(pool: &DatabasePool, user_id: i64, name: &str) -> i64 {
        let conn = pool.get().expect("connection");
        let ts = now();
        conn.execute(
            "INSERT INTO health_profiles (user_id, profile_name, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)",
            params![user_id, name, ts],
        )
        .expect("insert profile");
        conn.last_insert_rowid()
    }
}
