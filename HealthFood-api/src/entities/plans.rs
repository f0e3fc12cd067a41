use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use health_food_domain::entities::{ActivityLogInput, ActivityUpdate, MealLogInput, PlanRequest, PlanStatus};

/// Goal and constraints for a new plan
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicPlanRequest {
    pub title: String,
    /// For example `weight_loss`, `muscle_gain` or `endurance`
    pub goal_type: String,
    pub target_value: f64,
    pub target_unit: String,
    /// 1 to 365
    pub duration_days: i64,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub available_activities: Vec<String>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    pub notes: Option<String>,
}

impl From<PublicPlanRequest> for PlanRequest {
    fn from(request: PublicPlanRequest) -> Self {
        PlanRequest {
            title: request.title,
            goal_type: request.goal_type,
            target_value: request.target_value,
            target_unit: request.target_unit,
            duration_days: request.duration_days,
            start_date: request.start_date,
            available_activities: request.available_activities,
            dietary_restrictions: request.dietary_restrictions,
            notes: request.notes,
        }
    }
}

/// Query parameters for the plan listing
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct PlanListParams {
    /// `active`, `paused`, `completed` or `cancelled`
    #[param(value_type = Option<String>)]
    #[schema(value_type = Option<String>)]
    pub status: Option<PlanStatus>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct PlanStatusRequest {
    #[schema(value_type = String)]
    pub status: PlanStatus,
}

/// Query parameters for plan activities
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ActivityListParams {
    /// Only activities on this day
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PublicActivityUpdateRequest {
    pub activity_type: Option<String>,
    pub activity_name: Option<String>,
    pub duration_minutes: Option<i64>,
    pub is_completed: Option<bool>,
}

impl From<PublicActivityUpdateRequest> for ActivityUpdate {
    fn from(request: PublicActivityUpdateRequest) -> Self {
        ActivityUpdate {
            activity_type: request.activity_type,
            activity_name: request.activity_name,
            duration_minutes: request.duration_minutes,
            is_completed: request.is_completed,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MealCompletionRequest {
    pub is_completed: bool,
}

/// Rescale upcoming activities from `target_date`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdjustPlanRequest {
    pub target_date: NaiveDate,
    /// 1 to 30, default 7
    pub adjustment_days: Option<i64>,
    /// Free-text reason, only logged
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicActivityLogRequest {
    pub date: NaiveDate,
    pub activity_type: String,
    pub activity_name: Option<String>,
    pub duration_minutes: i64,
    /// `low`, `medium` or `high`
    pub intensity: Option<String>,
    /// Estimated from intensity and duration when omitted
    pub calories_burned: Option<f64>,
    pub notes: Option<String>,
}

impl From<PublicActivityLogRequest> for ActivityLogInput {
    fn from(request: PublicActivityLogRequest) -> Self {
        ActivityLogInput {
            date: request.date,
            activity_type: request.activity_type,
            activity_name: request.activity_name,
            duration_minutes: request.duration_minutes,
            intensity: request.intensity,
            calories_burned: request.calories_burned,
            notes: request.notes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicMealLogRequest {
    pub date: NaiveDate,
    pub meal_type: String,
    /// Items like `{"name": "rice", "calories": 200}`
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub food_items: Vec<Value>,
    /// Summed from the items when omitted
    pub total_calories: Option<f64>,
    pub notes: Option<String>,
}

impl From<PublicMealLogRequest> for MealLogInput {
    fn from(request: PublicMealLogRequest) -> Self {
        MealLogInput {
            date: request.date,
            meal_type: request.meal_type,
            food_items: request.food_items,
            total_calories: request.total_calories,
            notes: request.notes,
        }
    }
}

/// Query parameters for auto-matching
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct AutoMatchParams {
    /// Days of logs to check (default: 14, max: 90)
    pub days_back: Option<i64>,
}
