use async_trait::async_trait;
use rusqlite::{params, Row};

use super::columns::{encode, json_list, now};
use super::errors::RepositoryError;
use crate::database::DatabasePool;
use crate::models::{ActivityLogRecord, MealLogRecord, NewActivityLog, NewMealLog};

/// Repository trait for what a profile actually did and ate
#[async_trait]
pub trait LogRepositoryTrait: Send + Sync {
    async fn create_activity_log(&self, log: NewActivityLog) -> Result<ActivityLogRecord, RepositoryError>;

    /// Newest activity logs of a profile
    async fn list_activity_logs(&self, profile_id: i64, limit: u32) -> Result<Vec<ActivityLogRecord>, RepositoryError>;

    /// Delete an activity log of the profile
    async fn delete_activity_log(&self, profile_id: i64, log_id: i64) -> Result<bool, RepositoryError>;

    /// Activity logs dated on or after `since` that no plan activity claims yet
    async fn unmatched_activity_logs(&self, profile_id: i64, since: &str) -> Result<Vec<ActivityLogRecord>, RepositoryError>;

    async fn create_meal_log(&self, log: NewMealLog) -> Result<MealLogRecord, RepositoryError>;

    /// Newest meal logs of a profile
    async fn list_meal_logs(&self, profile_id: i64, limit: u32) -> Result<Vec<MealLogRecord>, RepositoryError>;

    /// Delete a meal log of the profile
    async fn delete_meal_log(&self, profile_id: i64, log_id: i64) -> Result<bool, RepositoryError>;

    /// Calories logged with `from <= date < until`
    async fn meal_calories_between(&self, profile_id: i64, from: &str, until: &str) -> Result<f64, RepositoryError>;
}

/// SQLite-backed log repository
#[derive(Debug, Clone)]
pub struct LogRepository {
    pool: DatabasePool,
}

impl LogRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

const ACTIVITY_LOG_COLUMNS: &str = "id, health_profile_id, date, activity_type, activity_name, \
     duration_minutes, intensity, calories_burned, notes, plan_activity_id, created_at";

const MEAL_LOG_COLUMNS: &str =
    "id, health_profile_id, date, meal_type, food_items_json, total_calories, notes, created_at";

fn map_activity_log(row: &Row<'_>) -> rusqlite::Result<ActivityLogRecord> {
    Ok(ActivityLogRecord {
        id: row.get(0)?,
        health_profile_id: row.get(1)?,
        date: row.get(2)?,
        activity_type: row.get(3)?,
        activity_name: row.get(4)?,
        duration_minutes: row.get(5)?,
        intensity: row.get(6)?,
        calories_burned: row.get(7)?,
        notes: row.get(8)?,
        plan_activity_id: row.get(9)?,
        created_at: row.get(10)?,
    })
}

fn map_meal_log(row: &Row<'_>) -> rusqlite::Result<MealLogRecord> {
    Ok(MealLogRecord {
        id: row.get(0)?,
        health_profile_id: row.get(1)?,
        date: row.get(2)?,
        meal_type: row.get(3)?,
        food_items: json_list(row.get(4)?),
        total_calories: row.get(5)?,
        notes: row.get(6)?,
        created_at: row.get(7)?,
    })
}

#[async_trait]
impl LogRepositoryTrait for LogRepository {
    async fn create_activity_log(&self, log: NewActivityLog) -> Result<ActivityLogRecord, RepositoryError> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO activity_logs
                (health_profile_id, date, activity_type, activity_name, duration_minutes, intensity,
                 calories_burned, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                log.health_profile_id,
                log.date,
                log.activity_type,
                log.activity_name,
                log.duration_minutes,
                log.intensity,
                log.calories_burned,
                log.notes,
                now()
            ],
        )?;
        let id = conn.last_insert_rowid();
        let record = conn.query_row(
            &format!("SELECT {} FROM activity_logs WHERE id = ?1", ACTIVITY_LOG_COLUMNS),
            [id],
            map_activity_log,
        )?;
        Ok(record)
    }

    async fn list_activity_logs(&self, profile_id: i64, limit: u32) -> Result<Vec<ActivityLogRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM activity_logs WHERE health_profile_id = ?1
             ORDER BY date DESC, id DESC LIMIT ?2",
            ACTIVITY_LOG_COLUMNS
        ))?;
        let rows = stmt.query_map(params![profile_id, limit], map_activity_log)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    async fn delete_activity_log(&self, profile_id: i64, log_id: i64) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let deleted = tx.execute(
            "DELETE FROM activity_logs WHERE id = ?1 AND health_profile_id = ?2",
            params![log_id, profile_id],
        )?;
        if deleted > 0 {
            // The plan activity stays completed; only the link goes away
            tx.execute(
                "UPDATE health_plan_activities SET activity_log_id = NULL WHERE activity_log_id = ?1",
                [log_id],
            )?;
        }
        tx.commit()?;
        Ok(deleted > 0)
    }

    async fn unmatched_activity_logs(&self, profile_id: i64, since: &str) -> Result<Vec<ActivityLogRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM activity_logs
             WHERE health_profile_id = ?1 AND date >= ?2 AND plan_activity_id IS NULL
             ORDER BY date, id",
            ACTIVITY_LOG_COLUMNS
        ))?;
        let rows = stmt.query_map(params![profile_id, since], map_activity_log)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    async fn create_meal_log(&self, log: NewMealLog) -> Result<MealLogRecord, RepositoryError> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO meal_logs
                (health_profile_id, date, meal_type, food_items_json, total_calories, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                log.health_profile_id,
                log.date,
                log.meal_type,
                encode(&log.food_items)?,
                log.total_calories,
                log.notes,
                now()
            ],
        )?;
        let id = conn.last_insert_rowid();
        let record = conn.query_row(
            &format!("SELECT {} FROM meal_logs WHERE id = ?1", MEAL_LOG_COLUMNS),
            [id],
            map_meal_log,
        )?;
        Ok(record)
    }

    async fn list_meal_logs(&self, profile_id: i64, limit: u32) -> Result<Vec<MealLogRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM meal_logs WHERE health_profile_id = ?1
             ORDER BY date DESC, id DESC LIMIT ?2",
            MEAL_LOG_COLUMNS
        ))?;
        let rows = stmt.query_map(params![profile_id, limit], map_meal_log)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    async fn delete_meal_log(&self, profile_id: i64, log_id: i64) -> Result<bool, RepositoryError> {
        let conn = self.pool.get()?;
        let deleted = conn.execute(
            "DELETE FROM meal_logs WHERE id = ?1 AND health_profile_id = ?2",
            params![log_id, profile_id],
        )?;
        Ok(deleted > 0)
    }

    async fn meal_calories_between(&self, profile_id: i64, from: &str, until: &str) -> Result<f64, RepositoryError> {
        let conn = self.pool.get()?;
        let total: f64 = conn.query_row(
            "SELECT COALESCE(SUM(total_calories), 0.0) FROM meal_logs
             WHERE health_profile_id = ?1 AND date >= ?2 AND date < ?3",
            params![profile_id, from, until],
            |row| row.get(0),
        )?;
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::{insert_profile, insert_user, test_pool};
    use serde_json::json;

    fn activity(profile_id: i64, date: &str) -> NewActivityLog {
        NewActivityLog {
            health_profile_id: profile_id,
            date: date.into(),
            activity_type: "walking".into(),
            activity_name: None,
            duration_minutes: 30,
            intensity: Some("low".into()),
            calories_burned: Some(120.0),
            notes: None,
        }
    }

    fn meal(profile_id: i64, date: &str, calories: f64) -> NewMealLog {
        NewMealLog {
            health_profile_id: profile_id,
            date: date.into(),
            meal_type: "dinner".into(),
            food_items: json!(["rice", "fish"]),
            total_calories: Some(calories),
            notes: None,
        }
    }

    #[tokio::test]
    async fn activity_logs_list_newest_first_and_delete_by_owner() {
        let pool = test_pool();
        let user = insert_user(&pool, "l@x.io");
        let profile = insert_profile(&pool, user, "Main");
        let other = insert_profile(&pool, user, "Other");
        let repo = LogRepository::new(pool);

        repo.create_activity_log(activity(profile, "2024-05-01")).await.unwrap();
        let newest = repo.create_activity_log(activity(profile, "2024-05-03")).await.unwrap();

        let listed = repo.list_activity_logs(profile, 20).await.unwrap();
        assert_eq!(listed[0].id, newest.id);

        assert!(!repo.delete_activity_log(other, newest.id).await.unwrap());
        assert!(repo.delete_activity_log(profile, newest.id).await.unwrap());
        assert_eq!(repo.list_activity_logs(profile, 20).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unmatched_logs_respect_window() {
        let pool = test_pool();
        let user = insert_user(&pool, "l@x.io");
        let profile = insert_profile(&pool, user, "Main");
        let repo = LogRepository::new(pool);

        repo.create_activity_log(activity(profile, "2024-04-01")).await.unwrap();
        repo.create_activity_log(activity(profile, "2024-05-02")).await.unwrap();

        let recent = repo.unmatched_activity_logs(profile, "2024-05-01").await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].date, "2024-05-02");
    }

    #[tokio::test]
    async fn meal_calories_are_summed_over_half_open_range() {
        let pool = test_pool();
        let user = insert_user(&pool, "l@x.io");
        let profile = insert_profile(&pool, user, "Main");
        let repo = LogRepository::new(pool);

        repo.create_meal_log(meal(profile, "2024-05-01", 500.0)).await.unwrap();
        repo.create_meal_log(meal(profile, "2024-05-02", 700.0)).await.unwrap();
        repo.create_meal_log(meal(profile, "2024-05-08", 900.0)).await.unwrap();

        let total = repo
            .meal_calories_between(profile, "2024-05-01", "2024-05-08")
            .await
            .unwrap();
        assert_eq!(total, 1200.0);

        let logs = repo.list_meal_logs(profile, 2).await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].food_items, json!(["rice", "fish"]));
        assert_eq!(
            repo.meal_calories_between(profile, "2030-01-01", "2030-02-01").await.unwrap(),
            0.0
        );
    }
}
