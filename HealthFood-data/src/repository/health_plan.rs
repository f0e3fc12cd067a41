use std::str::FromStr;

use async_trait::async_trait;
use rusqlite::types::{Type, Value as SqlValue};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::debug;

use super::columns::{encode, json_list, json_object, now};
use super::errors::RepositoryError;
use crate::database::DatabasePool;
use crate::models::{
    HealthPlanRecord, NewHealthPlan, NewPlanActivity, NewPlanMeal, PlanActivityChanges,
    PlanActivityRecord, PlanMealRecord, PlanStatus,
};

/// Repository trait for health plans and their day-by-day schedule
#[async_trait]
pub trait HealthPlanRepositoryTrait: Send + Sync {
    /// Store a plan together with its schedule in one transaction
    async fn create_with_schedule(
        &self,
        plan: NewHealthPlan,
        activities: Vec<NewPlanActivity>,
        meals: Vec<NewPlanMeal>,
    ) -> Result<HealthPlanRecord, RepositoryError>;

    /// Plans of a profile, newest first
    async fn list_for_profile(&self, profile_id: i64, status: Option<PlanStatus>) -> Result<Vec<HealthPlanRecord>, RepositoryError>;

    async fn get_for_profile(&self, plan_id: i64, profile_id: i64) -> Result<Option<HealthPlanRecord>, RepositoryError>;

    /// A plan when its profile belongs to the user
    async fn get_for_user(&self, plan_id: i64, user_id: i64) -> Result<Option<HealthPlanRecord>, RepositoryError>;

    async fn update_status(&self, plan_id: i64, status: PlanStatus) -> Result<Option<HealthPlanRecord>, RepositoryError>;

    async fn delete(&self, plan_id: i64) -> Result<bool, RepositoryError>;

    /// Scheduled activities, optionally for one date
    async fn list_activities(&self, plan_id: i64, date: Option<&str>) -> Result<Vec<PlanActivityRecord>, RepositoryError>;

    /// Scheduled meals, optionally for one date
    async fn list_meals(&self, plan_id: i64, date: Option<&str>) -> Result<Vec<PlanMealRecord>, RepositoryError>;

    /// Activities with `from <= date < until`
    async fn activities_between(&self, plan_id: i64, from: &str, until: &str) -> Result<Vec<PlanActivityRecord>, RepositoryError>;

    /// Meals with `from <= date < until`
    async fn meals_between(&self, plan_id: i64, from: &str, until: &str) -> Result<Vec<PlanMealRecord>, RepositoryError>;

    /// Apply a partial update to one activity of the plan
    async fn update_activity(
        &self,
        plan_id: i64,
        activity_id: i64,
        changes: PlanActivityChanges,
    ) -> Result<Option<PlanActivityRecord>, RepositoryError>;

    async fn set_meal_completed(&self, plan_id: i64, meal_id: i64, completed: bool) -> Result<Option<PlanMealRecord>, RepositoryError>;

    /// Replace the not-yet-completed activities on a date; returns how many were inserted
    async fn replace_pending_activities(
        &self,
        plan_id: i64,
        date: &str,
        activities: Vec<NewPlanActivity>,
    ) -> Result<usize, RepositoryError>;

    /// A pending activity of an active plan of the profile on the date with the given type
    async fn find_pending_match(
        &self,
        profile_id: i64,
        date: &str,
        activity_type: &str,
    ) -> Result<Option<PlanActivityRecord>, RepositoryError>;

    /// Mark a plan activity completed by an activity log and link both rows
    async fn complete_with_log(&self, activity_id: i64, log_id: i64) -> Result<(), RepositoryError>;
}

/// SQLite-backed health plan repository
#[derive(Debug, Clone)]
pub struct HealthPlanRepository {
    pool: DatabasePool,
}

impl HealthPlanRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

const PLAN_COLUMNS: &str = "hp.id, hp.health_profile_id, hp.title, hp.goal_type, hp.target_value, \
     hp.target_unit, hp.duration_days, hp.start_date, hp.end_date, hp.status, \
     hp.available_activities_json, hp.dietary_restrictions_json, hp.ai_analysis_json, hp.notes, \
     hp.created_at, hp.updated_at";

const ACTIVITY_COLUMNS: &str = "a.id, a.health_plan_id, a.date, a.activity_type, a.activity_name, \
     a.duration_minutes, a.intensity, a.calories_target, a.instructions, a.is_completed, \
     a.completed_at, a.activity_log_id";

const MEAL_COLUMNS: &str = "m.id, m.health_plan_id, m.date, m.meal_type, m.food_items_json, \
     m.total_calories, m.macros_json, m.preparation_notes, m.is_completed, m.completed_at";

fn map_plan(row: &Row<'_>) -> rusqlite::Result<HealthPlanRecord> {
    let status: String = row.get(9)?;
    let status = PlanStatus::from_str(&status)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(9, Type::Text, e.into()))?;

    Ok(HealthPlanRecord {
        id: row.get(0)?,
        health_profile_id: row.get(1)?,
        title: row.get(2)?,
        goal_type: row.get(3)?,
        target_value: row.get(4)?,
        target_unit: row.get(5)?,
        duration_days: row.get(6)?,
        start_date: row.get(7)?,
        end_date: row.get(8)?,
        status,
        available_activities: json_list(row.get(10)?),
        dietary_restrictions: json_list(row.get(11)?),
        ai_analysis: json_object(row.get(12)?),
        notes: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

fn map_activity(row: &Row<'_>) -> rusqlite::Result<PlanActivityRecord> {
    Ok(PlanActivityRecord {
        id: row.get(0)?,
        health_plan_id: row.get(1)?,
        date: row.get(2)?,
        activity_type: row.get(3)?,
        activity_name: row.get(4)?,
        duration_minutes: row.get(5)?,
        intensity: row.get(6)?,
        calories_target: row.get(7)?,
        instructions: row.get(8)?,
        is_completed: row.get(9)?,
        completed_at: row.get(10)?,
        activity_log_id: row.get(11)?,
    })
}

fn map_meal(row: &Row<'_>) -> rusqlite::Result<PlanMealRecord> {
    Ok(PlanMealRecord {
        id: row.get(0)?,
        health_plan_id: row.get(1)?,
        date: row.get(2)?,
        meal_type: row.get(3)?,
        food_items: json_list(row.get(4)?),
        total_calories: row.get(5)?,
        macros: json_object(row.get(6)?),
        preparation_notes: row.get(7)?,
        is_completed: row.get(8)?,
        completed_at: row.get(9)?,
    })
}

fn fetch_plan(conn: &Connection, plan_id: i64) -> rusqlite::Result<Option<HealthPlanRecord>> {
    conn.query_row(
        &format!("SELECT {} FROM health_plans hp WHERE hp.id = ?1", PLAN_COLUMNS),
        [plan_id],
        map_plan,
    )
    .optional()
}

fn fetch_activity(conn: &Connection, plan_id: i64, activity_id: i64) -> rusqlite::Result<Option<PlanActivityRecord>> {
    conn.query_row(
        &format!(
            "SELECT {} FROM health_plan_activities a WHERE a.id = ?1 AND a.health_plan_id = ?2",
            ACTIVITY_COLUMNS
        ),
        params![activity_id, plan_id],
        map_activity,
    )
    .optional()
}

fn fetch_meal(conn: &Connection, plan_id: i64, meal_id: i64) -> rusqlite::Result<Option<PlanMealRecord>> {
    conn.query_row(
        &format!(
            "SELECT {} FROM health_plan_meals m WHERE m.id = ?1 AND m.health_plan_id = ?2",
            MEAL_COLUMNS
        ),
        params![meal_id, plan_id],
        map_meal,
    )
    .optional()
}

fn insert_activity(conn: &Connection, plan_id: i64, activity: &NewPlanActivity) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO health_plan_activities
            (health_plan_id, date, activity_type, activity_name, duration_minutes, intensity,
             calories_target, instructions)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            plan_id,
            activity.date,
            activity.activity_type,
            activity.activity_name,
            activity.duration_minutes,
            activity.intensity,
            activity.calories_target,
            activity.instructions
        ],
    )
}

fn insert_meal(conn: &Connection, plan_id: i64, meal: &NewPlanMeal) -> Result<usize, RepositoryError> {
    Ok(conn.execute(
        "INSERT INTO health_plan_meals
            (health_plan_id, date, meal_type, food_items_json, total_calories, macros_json, preparation_notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            plan_id,
            meal.date,
            meal.meal_type,
            encode(&meal.food_items)?,
            meal.total_calories,
            encode(&meal.macros)?,
            meal.preparation_notes
        ],
    )?)
}

enum DateFilter<'a> {
    Any,
    On(&'a str),
    Between(&'a str, &'a str),
}

impl<'a> From<Option<&'a str>> for DateFilter<'a> {
    fn from(date: Option<&'a str>) -> Self {
        date.map_or(DateFilter::Any, DateFilter::On)
    }
}

/// Run a schedule query for one plan with a date filter
fn query_schedule<T>(
    conn: &Connection,
    base: &str,
    plan_id: i64,
    filter: DateFilter<'_>,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
    order: &str,
) -> Result<Vec<T>, RepositoryError> {
    let mut values = vec![SqlValue::Integer(plan_id)];
    let mut sql = base.to_string();
    match filter {
        DateFilter::Any => {}
        DateFilter::On(date) => {
            sql.push_str(" AND date = ?");
            values.push(SqlValue::Text(date.to_string()));
        }
        DateFilter::Between(from, until) => {
            sql.push_str(" AND date >= ? AND date < ?");
            values.push(SqlValue::Text(from.to_string()));
            values.push(SqlValue::Text(until.to_string()));
        }
    }
    sql.push_str(order);

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values), map)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

#[async_trait]
impl HealthPlanRepositoryTrait for HealthPlanRepository {
    async fn create_with_schedule(
        &self,
        plan: NewHealthPlan,
        activities: Vec<NewPlanActivity>,
        meals: Vec<NewPlanMeal>,
    ) -> Result<HealthPlanRecord, RepositoryError> {
        let mut conn = self.pool.get()?;
        let ts = now();

        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO health_plans
                (health_profile_id, title, goal_type, target_value, target_unit, duration_days,
                 start_date, end_date, status, available_activities_json, dietary_restrictions_json,
                 ai_analysis_json, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'active', ?9, ?10, ?11, ?12, ?13, ?13)",
            params![
                plan.health_profile_id,
                plan.title,
                plan.goal_type,
                plan.target_value,
                plan.target_unit,
                plan.duration_days,
                plan.start_date,
                plan.end_date,
                encode(&plan.available_activities)?,
                encode(&plan.dietary_restrictions)?,
                encode(&plan.ai_analysis)?,
                plan.notes,
                ts
            ],
        )?;
        let plan_id = tx.last_insert_rowid();

        for activity in &activities {
            insert_activity(&tx, plan_id, activity)?;
        }
        for meal in &meals {
            insert_meal(&tx, plan_id, meal)?;
        }

        let record = fetch_plan(&tx, plan_id)?
            .ok_or_else(|| RepositoryError::NotFound(format!("health plan {}", plan_id)))?;
        tx.commit()?;

        debug!(
            "Created health plan {} with {} activities and {} meals",
            plan_id,
            activities.len(),
            meals.len()
        );
        Ok(record)
    }

    async fn list_for_profile(&self, profile_id: i64, status: Option<PlanStatus>) -> Result<Vec<HealthPlanRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        let plans = match status {
            Some(status) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM health_plans hp WHERE hp.health_profile_id = ?1 AND hp.status = ?2
                     ORDER BY hp.created_at DESC, hp.id DESC",
                    PLAN_COLUMNS
                ))?;
                let rows = stmt.query_map(params![profile_id, status.as_str()], map_plan)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM health_plans hp WHERE hp.health_profile_id = ?1
                     ORDER BY hp.created_at DESC, hp.id DESC",
                    PLAN_COLUMNS
                ))?;
                let rows = stmt.query_map([profile_id], map_plan)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };
        Ok(plans)
    }

    async fn get_for_profile(&self, plan_id: i64, profile_id: i64) -> Result<Option<HealthPlanRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        let plan = conn
            .query_row(
                &format!(
                    "SELECT {} FROM health_plans hp WHERE hp.id = ?1 AND hp.health_profile_id = ?2",
                    PLAN_COLUMNS
                ),
                params![plan_id, profile_id],
                map_plan,
            )
            .optional()?;
        Ok(plan)
    }

    async fn get_for_user(&self, plan_id: i64, user_id: i64) -> Result<Option<HealthPlanRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        let plan = conn
            .query_row(
                &format!(
                    "SELECT {} FROM health_plans hp
                     JOIN health_profiles p ON p.id = hp.health_profile_id
                     WHERE hp.id = ?1 AND p.user_id = ?2",
                    PLAN_COLUMNS
                ),
                params![plan_id, user_id],
                map_plan,
            )
            .optional()?;
        Ok(plan)
    }

    async fn update_status(&self, plan_id: i64, status: PlanStatus) -> Result<Option<HealthPlanRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        conn.execute(
            "UPDATE health_plans SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.as_str(), now(), plan_id],
        )?;
        Ok(fetch_plan(&conn, plan_id)?)
    }

    async fn delete(&self, plan_id: i64) -> Result<bool, RepositoryError> {
        let conn = self.pool.get()?;
        let deleted = conn.execute("DELETE FROM health_plans WHERE id = ?1", [plan_id])?;
        Ok(deleted > 0)
    }

    async fn list_activities(&self, plan_id: i64, date: Option<&str>) -> Result<Vec<PlanActivityRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        query_schedule(
            &conn,
            &format!("SELECT {} FROM health_plan_activities a WHERE a.health_plan_id = ?", ACTIVITY_COLUMNS),
            plan_id,
            date.into(),
            map_activity,
            " ORDER BY a.date, a.id",
        )
    }

    async fn list_meals(&self, plan_id: i64, date: Option<&str>) -> Result<Vec<PlanMealRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        query_schedule(
            &conn,
            &format!("SELECT {} FROM health_plan_meals m WHERE m.health_plan_id = ?", MEAL_COLUMNS),
            plan_id,
            date.into(),
            map_meal,
            " ORDER BY m.date, m.id",
        )
    }

    async fn activities_between(&self, plan_id: i64, from: &str, until: &str) -> Result<Vec<PlanActivityRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        query_schedule(
            &conn,
            &format!("SELECT {} FROM health_plan_activities a WHERE a.health_plan_id = ?", ACTIVITY_COLUMNS),
            plan_id,
            DateFilter::Between(from, until),
            map_activity,
            " ORDER BY a.date, a.id",
        )
    }

    async fn meals_between(&self, plan_id: i64, from: &str, until: &str) -> Result<Vec<PlanMealRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        query_schedule(
            &conn,
            &format!("SELECT {} FROM health_plan_meals m WHERE m.health_plan_id = ?", MEAL_COLUMNS),
            plan_id,
            DateFilter::Between(from, until),
            map_meal,
            " ORDER BY m.date, m.id",
        )
    }

    async fn update_activity(
        &self,
        plan_id: i64,
        activity_id: i64,
        changes: PlanActivityChanges,
    ) -> Result<Option<PlanActivityRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        if fetch_activity(&conn, plan_id, activity_id)?.is_none() {
            return Ok(None);
        }

        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<SqlValue> = Vec::new();

        if let Some(kind) = changes.activity_type {
            sets.push("activity_type = ?");
            values.push(SqlValue::Text(kind));
        }
        if let Some(name) = changes.activity_name {
            sets.push("activity_name = ?");
            values.push(SqlValue::Text(name));
        }
        if let Some(minutes) = changes.duration_minutes {
            sets.push("duration_minutes = ?");
            values.push(SqlValue::Integer(minutes));
        }
        if let Some(completed) = changes.is_completed {
            sets.push("is_completed = ?");
            values.push(SqlValue::Integer(completed as i64));
            sets.push("completed_at = ?");
            values.push(if completed {
                SqlValue::Text(now())
            } else {
                SqlValue::Null
            });
        }

        if !sets.is_empty() {
            values.push(SqlValue::Integer(activity_id));
            let sql = format!("UPDATE health_plan_activities SET {} WHERE id = ?", sets.join(", "));
            conn.execute(&sql, params_from_iter(values))?;
        }

        Ok(fetch_activity(&conn, plan_id, activity_id)?)
    }

    async fn set_meal_completed(&self, plan_id: i64, meal_id: i64, completed: bool) -> Result<Option<PlanMealRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        let completed_at = completed.then(now);
        conn.execute(
            "UPDATE health_plan_meals SET is_completed = ?1, completed_at = ?2
             WHERE id = ?3 AND health_plan_id = ?4",
            params![completed, completed_at, meal_id, plan_id],
        )?;
        Ok(fetch_meal(&conn, plan_id, meal_id)?)
    }

    async fn replace_pending_activities(
        &self,
        plan_id: i64,
        date: &str,
        activities: Vec<NewPlanActivity>,
    ) -> Result<usize, RepositoryError> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM health_plan_activities WHERE health_plan_id = ?1 AND date = ?2 AND is_completed = 0",
            params![plan_id, date],
        )?;
        for activity in &activities {
            insert_activity(&tx, plan_id, activity)?;
        }
        tx.commit()?;
        Ok(activities.len())
    }

    async fn find_pending_match(
        &self,
        profile_id: i64,
        date: &str,
        activity_type: &str,
    ) -> Result<Option<PlanActivityRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        let activity = conn
            .query_row(
                &format!(
                    "SELECT {} FROM health_plan_activities a
                     JOIN health_plans hp ON hp.id = a.health_plan_id
                     WHERE hp.health_profile_id = ?1 AND hp.status = 'active'
                       AND a.date = ?2 AND a.is_completed = 0
                       AND LOWER(a.activity_type) = LOWER(?3)
                     ORDER BY a.id LIMIT 1",
                    ACTIVITY_COLUMNS
                ),
                params![profile_id, date, activity_type.trim()],
                map_activity,
            )
            .optional()?;
        Ok(activity)
    }

    async fn complete_with_log(&self, activity_id: i64, log_id: i64) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get()?;
        let ts = now();
        let tx = conn.transaction()?;
        let updated = tx.execute(
            "UPDATE health_plan_activities SET is_completed = 1, completed_at = ?1, activity_log_id = ?2
             WHERE id = ?3",
            params![ts, log_id, activity_id],
        )?;
        if updated == 0 {
            return Err(RepositoryError::NotFound(format!("plan activity {}", activity_id)));
        }
        tx.execute(
            "UPDATE activity_logs SET plan_activity_id = ?1 WHERE id = ?2",
            params![activity_id, log_id],
        )?;
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::{insert_profile, insert_user, test_pool};
    use serde_json::json;

    fn new_plan(profile_id: i64) -> NewHealthPlan {
        NewHealthPlan {
            health_profile_id: profile_id,
            title: "Lose 3kg".into(),
            goal_type: "weight_loss".into(),
            target_value: 3.0,
            target_unit: "kg".into(),
            duration_days: 14,
            start_date: "2024-05-01".into(),
            end_date: "2024-05-14".into(),
            available_activities: json!(["walking"]),
            dietary_restrictions: json!([]),
            ai_analysis: json!({"feasibility_score": 7}),
            notes: None,
        }
    }

    fn walk(date: &str) -> NewPlanActivity {
        NewPlanActivity {
            date: date.into(),
            activity_type: "Walking".into(),
            activity_name: "Brisk walk".into(),
            duration_minutes: 30,
            intensity: Some("medium".into()),
            calories_target: Some(150.0),
            instructions: None,
        }
    }

    fn lunch(date: &str) -> NewPlanMeal {
        NewPlanMeal {
            date: date.into(),
            meal_type: "lunch".into(),
            food_items: json!([]),
            total_calories: Some(600.0),
            macros: json!({"protein_percent": 20}),
            preparation_notes: None,
        }
    }

    async fn setup() -> (HealthPlanRepository, i64, i64, HealthPlanRecord) {
        let pool = test_pool();
        let user = insert_user(&pool, "plan@x.io");
        let profile = insert_profile(&pool, user, "Main");
        let repo = HealthPlanRepository::new(pool);
        let plan = repo
            .create_with_schedule(
                new_plan(profile),
                vec![walk("2024-05-01"), walk("2024-05-02"), walk("2024-05-03")],
                vec![lunch("2024-05-01"), lunch("2024-05-02")],
            )
            .await
            .unwrap();
        (repo, user, profile, plan)
    }

    #[tokio::test]
    async fn plan_is_stored_with_schedule() {
        let (repo, user, profile, plan) = setup().await;

        assert_eq!(plan.status, PlanStatus::Active);
        assert_eq!(plan.ai_analysis, json!({"feasibility_score": 7}));
        assert_eq!(repo.list_activities(plan.id, None).await.unwrap().len(), 3);
        assert_eq!(repo.list_meals(plan.id, Some("2024-05-02")).await.unwrap().len(), 1);
        assert!(repo.get_for_user(plan.id, user).await.unwrap().is_some());
        assert!(repo.get_for_user(plan.id, user + 1).await.unwrap().is_none());
        assert!(repo.get_for_profile(plan.id, profile).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn status_filter_and_update() {
        let (repo, _, profile, plan) = setup().await;

        repo.update_status(plan.id, PlanStatus::Paused).await.unwrap();
        assert!(repo
            .list_for_profile(profile, Some(PlanStatus::Active))
            .await
            .unwrap()
            .is_empty());
        assert_eq!(repo.list_for_profile(profile, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn range_queries_are_half_open() {
        let (repo, _, _, plan) = setup().await;

        let window = repo
            .activities_between(plan.id, "2024-05-01", "2024-05-03")
            .await
            .unwrap();
        assert_eq!(window.len(), 2);
        let meals = repo.meals_between(plan.id, "2024-05-02", "2024-05-10").await.unwrap();
        assert_eq!(meals.len(), 1);
    }

    #[tokio::test]
    async fn replacing_keeps_completed_activities() {
        let (repo, _, _, plan) = setup().await;
        let first = repo.list_activities(plan.id, Some("2024-05-01")).await.unwrap()[0].clone();
        repo.update_activity(
            plan.id,
            first.id,
            PlanActivityChanges {
                is_completed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let inserted = repo
            .replace_pending_activities(plan.id, "2024-05-01", vec![walk("2024-05-01"), walk("2024-05-01")])
            .await
            .unwrap();
        assert_eq!(inserted, 2);

        let day = repo.list_activities(plan.id, Some("2024-05-01")).await.unwrap();
        assert_eq!(day.len(), 3);
        assert_eq!(day.iter().filter(|a| a.is_completed).count(), 1);
    }

    #[tokio::test]
    async fn pending_match_is_case_insensitive_and_skips_inactive_plans() {
        let (repo, _, profile, plan) = setup().await;

        let found = repo
            .find_pending_match(profile, "2024-05-02", "walking")
            .await
            .unwrap();
        assert!(found.is_some());

        repo.update_status(plan.id, PlanStatus::Completed).await.unwrap();
        assert!(repo
            .find_pending_match(profile, "2024-05-02", "walking")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn meal_completion_toggles_timestamp() {
        let (repo, _, _, plan) = setup().await;
        let meal = repo.list_meals(plan.id, None).await.unwrap()[0].clone();

        let done = repo.set_meal_completed(plan.id, meal.id, true).await.unwrap().unwrap();
        assert!(done.is_completed);
        assert!(done.completed_at.is_some());

        let undone = repo.set_meal_completed(plan.id, meal.id, false).await.unwrap().unwrap();
        assert!(undone.completed_at.is_none());

        assert!(repo.set_meal_completed(plan.id + 1, meal.id, true).await.unwrap().is_none());
    }
}
