use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use super::columns::now;
use super::errors::RepositoryError;
use crate::database::DatabasePool;
use crate::models::{NewUser, NewUserSession, UserRecord, UserSessionRecord};

/// Repository trait for user accounts and their login sessions
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    /// Create a user; the email is trimmed and lower-cased
    async fn create(&self, user: NewUser) -> Result<UserRecord, RepositoryError>;

    /// Find an active user by email
    async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError>;

    /// Find an active user by id
    async fn get_by_id(&self, id: i64) -> Result<Option<UserRecord>, RepositoryError>;

    /// Stamp the last login time
    async fn record_login(&self, id: i64) -> Result<(), RepositoryError>;

    /// Record a session for an issued token
    async fn create_session(&self, session: NewUserSession) -> Result<UserSessionRecord, RepositoryError>;

    /// Find an unexpired session by token hash
    async fn find_session(&self, token_hash: &str) -> Result<Option<UserSessionRecord>, RepositoryError>;

    /// Remove a session; returns whether one existed
    async fn delete_session(&self, token_hash: &str) -> Result<bool, RepositoryError>;
}

/// SQLite-backed user repository
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: DatabasePool,
}

impl UserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str =
    "id, email, password_hash, full_name, role, is_active, last_login_at, created_at, updated_at";

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        full_name: row.get(3)?,
        role: row.get(4)?,
        is_active: row.get(5)?,
        last_login_at: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn map_session(row: &Row<'_>) -> rusqlite::Result<UserSessionRecord> {
    Ok(UserSessionRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        token_hash: row.get(2)?,
        expires_at: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Canonical form used for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn create(&self, user: NewUser) -> Result<UserRecord, RepositoryError> {
        let conn = self.pool.get()?;
        let email = normalize_email(&user.email);
        let ts = now();

        debug!("Creating user account for {}", email);
        conn.execute(
            "INSERT INTO users (email, password_hash, full_name, role, is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)",
            params![email, user.password_hash, user.full_name.trim(), user.role, ts],
        )
        .map_err(|e| RepositoryError::from_insert(e, "Email already registered"))?;

        let id = conn.last_insert_rowid();
        let record = conn.query_row(
            &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
            [id],
            map_user,
        )?;
        Ok(record)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                &format!(
                    "SELECT {} FROM users WHERE email = ?1 AND is_active = 1",
                    USER_COLUMNS
                ),
                [normalize_email(email)],
                map_user,
            )
            .optional()?;
        Ok(user)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<UserRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?1 AND is_active = 1", USER_COLUMNS),
                [id],
                map_user,
            )
            .optional()?;
        Ok(user)
    }

    async fn record_login(&self, id: i64) -> Result<(), RepositoryError> {
        let conn = self.pool.get()?;
        let ts = now();
        let updated = conn.execute(
            "UPDATE users SET last_login_at = ?1, updated_at = ?1 WHERE id = ?2",
            params![ts, id],
        )?;
        if updated == 0 {
            return Err(RepositoryError::NotFound(format!("user {}", id)));
        }
        Ok(())
    }

    async fn create_session(&self, session: NewUserSession) -> Result<UserSessionRecord, RepositoryError> {
        let conn = self.pool.get()?;
        let purged = conn.execute("DELETE FROM user_sessions WHERE expires_at <= ?1", [now()])?;
        if purged > 0 {
            debug!("Purged {} expired sessions", purged);
        }
        conn.execute(
            "INSERT INTO user_sessions (user_id, token_hash, device_info, ip_address, expires_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                session.user_id,
                session.token_hash,
                session.device_info,
                session.ip_address,
                session.expires_at,
                now()
            ],
        )?;
        let id = conn.last_insert_rowid();
        let record = conn.query_row(
            "SELECT id, user_id, token_hash, expires_at, created_at FROM user_sessions WHERE id = ?1",
            [id],
            map_session,
        )?;
        Ok(record)
    }

    async fn find_session(&self, token_hash: &str) -> Result<Option<UserSessionRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        let session = conn
            .query_row(
                "SELECT id, user_id, token_hash, expires_at, created_at FROM user_sessions
                 WHERE token_hash = ?1 AND expires_at > ?2
                 ORDER BY id DESC LIMIT 1",
                params![token_hash, now()],
                map_session,
            )
            .optional()?;
        Ok(session)
    }

    async fn delete_session(&self, token_hash: &str) -> Result<bool, RepositoryError> {
        let conn = self.pool.get()?;
        let deleted = conn.execute("DELETE FROM user_sessions WHERE token_hash = ?1", [token_hash])?;
        Ok(deleted > 0)
    }
}
