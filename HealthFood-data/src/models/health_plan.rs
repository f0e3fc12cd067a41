use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle state of a health plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    #[default]
    Active,
    Paused,
    Completed,
    Cancelled,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Active => "active",
            PlanStatus::Paused => "paused",
            PlanStatus::Completed => "completed",
            PlanStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(PlanStatus::Active),
            "paused" => Ok(PlanStatus::Paused),
            "completed" => Ok(PlanStatus::Completed),
            "cancelled" => Ok(PlanStatus::Cancelled),
            other => Err(format!("invalid plan status: {}", other)),
        }
    }
}

/// Stored health plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthPlanRecord {
    pub id: i64,
    pub health_profile_id: i64,
    pub title: String,
    pub goal_type: String,
    pub target_value: f64,
    pub target_unit: String,
    pub duration_days: i64,
    pub start_date: String,
    pub end_date: String,
    pub status: PlanStatus,
    pub available_activities: Value,
    pub dietary_restrictions: Value,
    /// AI analysis the schedule was generated from
    pub ai_analysis: Value,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Input for creating a health plan
#[derive(Debug, Clone)]
pub struct NewHealthPlan {
    pub health_profile_id: i64,
    pub title: String,
    pub goal_type: String,
    pub target_value: f64,
    pub target_unit: String,
    pub duration_days: i64,
    pub start_date: String,
    pub end_date: String,
    pub available_activities: Value,
    pub dietary_restrictions: Value,
    pub ai_analysis: Value,
    pub notes: Option<String>,
}

/// Scheduled activity inside a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanActivityRecord {
    pub id: i64,
    pub health_plan_id: i64,
    pub date: String,
    pub activity_type: String,
    pub activity_name: String,
    pub duration_minutes: i64,
    pub intensity: Option<String>,
    pub calories_target: Option<f64>,
    pub instructions: Option<String>,
    pub is_completed: bool,
    pub completed_at: Option<String>,
    pub activity_log_id: Option<i64>,
}

/// Input for scheduling an activity
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlanActivity {
    pub date: String,
    pub activity_type: String,
    pub activity_name: String,
    pub duration_minutes: i64,
    pub intensity: Option<String>,
    pub calories_target: Option<f64>,
    pub instructions: Option<String>,
}

/// Partial update of a scheduled activity
#[derive(Debug, Clone, Default)]
pub struct PlanActivityChanges {
    pub activity_type: Option<String>,
    pub activity_name: Option<String>,
    pub duration_minutes: Option<i64>,
    pub is_completed: Option<bool>,
}

/// Scheduled meal inside a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanMealRecord {
    pub id: i64,
    pub health_plan_id: i64,
    pub date: String,
    pub meal_type: String,
    pub food_items: Value,
    pub total_calories: Option<f64>,
    pub macros: Value,
    pub preparation_notes: Option<String>,
    pub is_completed: bool,
    pub completed_at: Option<String>,
}

/// Input for scheduling a meal
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlanMeal {
    pub date: String,
    pub meal_type: String,
    pub food_items: Value,
    pub total_calories: Option<f64>,
    pub macros: Value,
    pub preparation_notes: Option<String>,
}
