//! Health plans, their schedules and the logs checked against them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

pub use health_food_data::models::PlanStatus;

/// AI assessment a plan's schedule is generated from
///
/// Every field has a default so partial model output still parses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(default)]
pub struct PlanAnalysis {
    /// 1 to 10, higher is more achievable
    pub feasibility_score: f64,
    pub weekly_targets: Vec<WeeklyTarget>,
    pub exercise_recommendations: Vec<ExerciseRecommendation>,
    pub nutrition_guidelines: NutritionGuidelines,
    pub risk_factors: Vec<String>,
    pub success_tips: Vec<String>,
    pub progress_indicators: Vec<String>,
}

impl Default for PlanAnalysis {
    fn default() -> Self {
        Self {
            feasibility_score: 7.0,
            weekly_targets: Vec::new(),
            exercise_recommendations: Vec::new(),
            nutrition_guidelines: NutritionGuidelines::default(),
            risk_factors: Vec::new(),
            success_tips: Vec::new(),
            progress_indicators: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(default)]
pub struct WeeklyTarget {
    pub week: u32,
    /// Percent of the goal reached by the end of the week
    pub target_progress: f64,
    pub focus: String,
}

impl Default for WeeklyTarget {
    fn default() -> Self {
        Self {
            week: 1,
            target_progress: 0.0,
            focus: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(default)]
pub struct ExerciseRecommendation {
    pub activity: String,
    pub frequency_per_week: f64,
    pub duration_minutes: f64,
    /// `low`, `medium` or `high`
    pub intensity: String,
    pub calories_per_session: Option<f64>,
    pub notes: Option<String>,
}

impl Default for ExerciseRecommendation {
    fn default() -> Self {
        Self {
            activity: "general".to_string(),
            frequency_per_week: 3.0,
            duration_minutes: 30.0,
            intensity: "medium".to_string(),
            calories_per_session: None,
            notes: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(default)]
pub struct NutritionGuidelines {
    pub daily_calories: f64,
    pub macros: Macros,
    pub meal_timing: Vec<String>,
    pub hydration_liters: f64,
    pub supplements: Vec<String>,
}

impl Default for NutritionGuidelines {
    fn default() -> Self {
        Self {
            daily_calories: 2000.0,
            macros: Macros::default(),
            meal_timing: vec!["breakfast".to_string(), "lunch".to_string(), "dinner".to_string()],
            hydration_liters: 2.5,
            supplements: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(default)]
pub struct Macros {
    pub protein_percent: f64,
    pub carbs_percent: f64,
    pub fat_percent: f64,
}

impl Default for Macros {
    fn default() -> Self {
        Self {
            protein_percent: 20.0,
            carbs_percent: 50.0,
            fat_percent: 30.0,
        }
    }
}

/// Request for a new plan
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PlanRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Goal type is required"))]
    pub goal_type: String,
    pub target_value: f64,
    #[validate(length(min = 1, message = "Target unit is required"))]
    pub target_unit: String,
    #[validate(range(min = 1, max = 365, message = "Duration must be between 1 and 365 days"))]
    pub duration_days: i64,
    pub start_date: NaiveDate,
    pub available_activities: Vec<String>,
    pub dietary_restrictions: Vec<String>,
    pub notes: Option<String>,
}

/// Result of plan creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreatedPlan {
    pub plan_id: i64,
    pub ai_analysis: PlanAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct HealthPlan {
    pub id: i64,
    pub health_profile_id: i64,
    pub title: String,
    pub goal_type: String,
    pub target_value: f64,
    pub target_unit: String,
    pub duration_days: i64,
    pub start_date: String,
    pub end_date: String,
    #[cfg_attr(feature = "with-api", schema(value_type = String))]
    pub status: PlanStatus,
    #[cfg_attr(feature = "with-api", schema(value_type = Vec<String>))]
    pub available_activities: Value,
    #[cfg_attr(feature = "with-api", schema(value_type = Vec<String>))]
    pub dietary_restrictions: Value,
    pub notes: Option<String>,
    /// Present on detail views only
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "with-api", schema(value_type = Option<Object>))]
    pub ai_analysis: Option<Value>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct PlanActivity {
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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct PlanMeal {
    pub id: i64,
    pub health_plan_id: i64,
    pub date: String,
    pub meal_type: String,
    #[cfg_attr(feature = "with-api", schema(value_type = Vec<Object>))]
    pub food_items: Value,
    pub total_calories: Option<f64>,
    #[cfg_attr(feature = "with-api", schema(value_type = Object))]
    pub macros: Value,
    pub preparation_notes: Option<String>,
    pub is_completed: bool,
    pub completed_at: Option<String>,
}

/// Partial update of a scheduled activity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityUpdate {
    pub activity_type: Option<String>,
    pub activity_name: Option<String>,
    pub duration_minutes: Option<i64>,
    pub is_completed: Option<bool>,
}

/// Everything scheduled for one plan day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct DailySummary {
    pub plan_id: i64,
    pub date: String,
    pub activities: Vec<PlanActivity>,
    pub meals: Vec<PlanMeal>,
    /// Completed share of the day's activities and meals, in percent
    pub completion_rate: f64,
    pub total_calories_target: f64,
    pub total_burn_target: f64,
}

/// How a plan was followed during the week before an adjustment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct AdjustmentAnalysis {
    pub window_start: String,
    pub window_end: String,
    pub planned_calories: f64,
    pub consumed_calories: f64,
    /// Consumed minus planned
    pub calorie_variance: f64,
    pub exercise_completion_rate: f64,
    pub needs_adjustment: bool,
    pub exercise_multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct AdjustedActivity {
    pub activity_type: String,
    pub activity_name: String,
    pub duration_minutes: i64,
    pub intensity: String,
    pub calories_target: Option<f64>,
    pub adjustment_reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct AdjustedDay {
    pub date: String,
    pub activities: Vec<AdjustedActivity>,
    pub adjustment_notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct AdjustmentResult {
    pub adjustment_analysis: AdjustmentAnalysis,
    pub adjusted_schedule: Vec<AdjustedDay>,
    pub message: String,
}

/// An exercise the user reports having done
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ActivityLogInput {
    pub date: NaiveDate,
    #[validate(length(min = 1, message = "Activity type is required"))]
    pub activity_type: String,
    pub activity_name: Option<String>,
    #[validate(range(min = 1, max = 1440, message = "Duration must be between 1 and 1440 minutes"))]
    pub duration_minutes: i64,
    pub intensity: Option<String>,
    /// Estimated from intensity and duration when missing
    pub calories_burned: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ActivityLog {
    pub id: i64,
    pub health_profile_id: i64,
    pub date: String,
    pub activity_type: String,
    pub activity_name: Option<String>,
    pub duration_minutes: i64,
    pub intensity: Option<String>,
    pub calories_burned: Option<f64>,
    pub notes: Option<String>,
    pub plan_activity_id: Option<i64>,
    pub created_at: String,
}

/// A meal the user reports having eaten
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MealLogInput {
    pub date: NaiveDate,
    #[validate(length(min = 1, message = "Meal type is required"))]
    pub meal_type: String,
    pub food_items: Vec<Value>,
    pub total_calories: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct MealLog {
    pub id: i64,
    pub health_profile_id: i64,
    pub date: String,
    pub meal_type: String,
    #[cfg_attr(feature = "with-api", schema(value_type = Vec<Object>))]
    pub food_items: Value,
    pub total_calories: Option<f64>,
    pub notes: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct AutoMatchResult {
    pub message: String,
    pub total_checked: usize,
    pub matched: usize,
}
