use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Logged physical activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLogRecord {
    pub id: i64,
    pub health_profile_id: i64,
    pub date: String,
    pub activity_type: String,
    pub activity_name: Option<String>,
    pub duration_minutes: i64,
    pub intensity: Option<String>,
    pub calories_burned: Option<f64>,
    pub notes: Option<String>,
    /// Plan activity this log was matched to
    pub plan_activity_id: Option<i64>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewActivityLog {
    pub health_profile_id: i64,
    pub date: String,
    pub activity_type: String,
    pub activity_name: Option<String>,
    pub duration_minutes: i64,
    pub intensity: Option<String>,
    pub calories_burned: Option<f64>,
    pub notes: Option<String>,
}

/// Logged meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealLogRecord {
    pub id: i64,
    pub health_profile_id: i64,
    pub date: String,
    pub meal_type: String,
    pub food_items: Value,
    pub total_calories: Option<f64>,
    pub notes: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewMealLog {
    pub health_profile_id: i64,
    pub date: String,
    pub meal_type: String,
    pub food_items: Value,
    pub total_calories: Option<f64>,
    pub notes: Option<String>,
}
