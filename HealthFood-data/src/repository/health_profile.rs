use async_trait::async_trait;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::debug;

use super::columns::{encode, json_object, now};
use super::errors::RepositoryError;
use crate::database::DatabasePool;
use crate::models::{HealthProfileChanges, HealthProfileRecord, NewHealthProfile};

const DUPLICATE_NAME: &str = "A profile with this name already exists";

/// Repository trait for health profiles
#[async_trait]
pub trait HealthProfileRepositoryTrait: Send + Sync {
    /// Create a profile; a default profile clears the flag on its siblings
    async fn create(&self, profile: NewHealthProfile) -> Result<HealthProfileRecord, RepositoryError>;

    /// Profiles of a user, default first then most recently updated
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<HealthProfileRecord>, RepositoryError>;

    /// A profile when it belongs to the user
    async fn get_for_user(&self, profile_id: i64, user_id: i64) -> Result<Option<HealthProfileRecord>, RepositoryError>;

    /// A profile regardless of owner
    async fn get_by_id(&self, profile_id: i64) -> Result<Option<HealthProfileRecord>, RepositoryError>;

    /// The default profile, or the oldest profile when none is flagged
    async fn get_default(&self, user_id: i64) -> Result<Option<HealthProfileRecord>, RepositoryError>;

    /// Apply a partial update; `None` when the profile is not the user's
    async fn update(
        &self,
        profile_id: i64,
        user_id: i64,
        changes: HealthProfileChanges,
    ) -> Result<Option<HealthProfileRecord>, RepositoryError>;

    /// Delete a profile owned by the user
    async fn delete(&self, profile_id: i64, user_id: i64) -> Result<bool, RepositoryError>;

    /// Number of profiles the user owns
    async fn count_for_user(&self, user_id: i64) -> Result<i64, RepositoryError>;
}

/// SQLite-backed health profile repository
#[derive(Debug, Clone)]
pub struct HealthProfileRepository {
    pool: DatabasePool,
}

impl HealthProfileRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

const PROFILE_COLUMNS: &str = "id, user_id, profile_name, age, gender, weight, height, \
     conditions_text, conditions_json, is_default, created_at, updated_at";

fn map_profile(row: &Row<'_>) -> rusqlite::Result<HealthProfileRecord> {
    Ok(HealthProfileRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        profile_name: row.get(2)?,
        age: row.get(3)?,
        gender: row.get(4)?,
        weight: row.get(5)?,
        height: row.get(6)?,
        conditions_text: row.get(7)?,
        conditions_json: json_object(row.get(8)?),
        is_default: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn fetch(conn: &Connection, profile_id: i64) -> rusqlite::Result<Option<HealthProfileRecord>> {
    conn.query_row(
        &format!("SELECT {} FROM health_profiles WHERE id = ?1", PROFILE_COLUMNS),
        [profile_id],
        map_profile,
    )
    .optional()
}

fn clear_default(conn: &Connection, user_id: i64, except: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE health_profiles SET is_default = 0 WHERE user_id = ?1 AND id != ?2",
        params![user_id, except],
    )
}

#[async_trait]
impl HealthProfileRepositoryTrait for HealthProfileRepository {
    async fn create(&self, profile: NewHealthProfile) -> Result<HealthProfileRecord, RepositoryError> {
        let mut conn = self.pool.get()?;
        let conditions = profile.conditions_json.as_ref().map(encode).transpose()?;
        let ts = now();

        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO health_profiles
                (user_id, profile_name, age, gender, weight, height, conditions_text,
                 conditions_json, is_default, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
            params![
                profile.user_id,
                profile.profile_name.trim(),
                profile.age,
                profile.gender,
                profile.weight,
                profile.height,
                profile.conditions_text,
                conditions,
                profile.is_default,
                ts
            ],
        )
        .map_err(|e| RepositoryError::from_insert(e, DUPLICATE_NAME))?;
        let id = tx.last_insert_rowid();

        if profile.is_default {
            clear_default(&tx, profile.user_id, id)?;
        }

        let record = fetch(&tx, id)?
            .ok_or_else(|| RepositoryError::NotFound(format!("health profile {}", id)))?;
        tx.commit()?;

        debug!("Created health profile {} for user {}", id, profile.user_id);
        Ok(record)
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<HealthProfileRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM health_profiles WHERE user_id = ?1
             ORDER BY is_default DESC, updated_at DESC, id DESC",
            PROFILE_COLUMNS
        ))?;
        let rows = stmt.query_map([user_id], map_profile)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    async fn get_for_user(&self, profile_id: i64, user_id: i64) -> Result<Option<HealthProfileRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        let profile = conn
            .query_row(
                &format!(
                    "SELECT {} FROM health_profiles WHERE id = ?1 AND user_id = ?2",
                    PROFILE_COLUMNS
                ),
                params![profile_id, user_id],
                map_profile,
            )
            .optional()?;
        Ok(profile)
    }

    async fn get_by_id(&self, profile_id: i64) -> Result<Option<HealthProfileRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        Ok(fetch(&conn, profile_id)?)
    }

    async fn get_default(&self, user_id: i64) -> Result<Option<HealthProfileRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        let profile = conn
            .query_row(
                &format!(
                    "SELECT {} FROM health_profiles WHERE user_id = ?1
                     ORDER BY is_default DESC, created_at ASC, id ASC LIMIT 1",
                    PROFILE_COLUMNS
                ),
                [user_id],
                map_profile,
            )
            .optional()?;
        Ok(profile)
    }

    async fn update(
        &self,
        profile_id: i64,
        user_id: i64,
        changes: HealthProfileChanges,
    ) -> Result<Option<HealthProfileRecord>, RepositoryError> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let owned: Option<i64> = tx
            .query_row(
                "SELECT id FROM health_profiles WHERE id = ?1 AND user_id = ?2",
                params![profile_id, user_id],
                |row| row.get(0),
            )
            .optional()?;
        if owned.is_none() {
            return Ok(None);
        }

        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<SqlValue> = Vec::new();

        if let Some(name) = changes.profile_name {
            sets.push("profile_name = ?");
            values.push(SqlValue::Text(name.trim().to_string()));
        }
        if let Some(age) = changes.age {
            sets.push("age = ?");
            values.push(SqlValue::Integer(age));
        }
        if let Some(gender) = changes.gender {
            sets.push("gender = ?");
            values.push(SqlValue::Text(gender));
        }
        if let Some(weight) = changes.weight {
            sets.push("weight = ?");
            values.push(SqlValue::Real(weight));
        }
        if let Some(height) = changes.height {
            sets.push("height = ?");
            values.push(SqlValue::Real(height));
        }
        if let Some(text) = changes.conditions_text {
            sets.push("conditions_text = ?");
            values.push(SqlValue::Text(text));
        }
        if let Some(json) = changes.conditions_json.as_ref() {
            sets.push("conditions_json = ?");
            values.push(SqlValue::Text(encode(json)?));
        }
        if let Some(is_default) = changes.is_default {
            sets.push("is_default = ?");
            values.push(SqlValue::Integer(is_default as i64));
        }

        if !sets.is_empty() {
            sets.push("updated_at = ?");
            values.push(SqlValue::Text(now()));
            values.push(SqlValue::Integer(profile_id));

            let sql = format!("UPDATE health_profiles SET {} WHERE id = ?", sets.join(", "));
            tx.execute(&sql, params_from_iter(values))
                .map_err(|e| RepositoryError::from_insert(e, DUPLICATE_NAME))?;

            if changes.is_default == Some(true) {
                clear_default(&tx, user_id, profile_id)?;
            }
        }

        let record = fetch(&tx, profile_id)?;
        tx.commit()?;
        Ok(record)
    }

    async fn delete(&self, profile_id: i64, user_id: i64) -> Result<bool, RepositoryError> {
        let conn = self.pool.get()?;
        let deleted = conn.execute(
            "DELETE FROM health_profiles WHERE id = ?1 AND user_id = ?2",
            params![profile_id, user_id],
        )?;
        Ok(deleted > 0)
    }

    async fn count_for_user(&self, user_id: i64) -> Result<i64, RepositoryError> {
        let conn = self.pool.get()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM health_profiles WHERE user_id = ?1",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
