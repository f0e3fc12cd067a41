use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Data for a new health profile
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProfileInput {
    #[validate(length(min = 1, message = "Profile name is required"))]
    pub profile_name: String,
    #[validate(range(min = 0, max = 120, message = "Age must be between 0 and 120"))]
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    /// Free-text medical history, standardized by the AI when present
    pub conditions_text: Option<String>,
    /// Conditions picked from a list, stored under `conditions_list`
    pub conditions_list: Option<Vec<String>>,
    pub is_default: bool,
}

/// Partial profile update; `None` leaves a field alone
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 1, message = "Profile name cannot be empty"))]
    pub profile_name: Option<String>,
    #[validate(range(min = 0, max = 120, message = "Age must be between 0 and 120"))]
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub conditions_text: Option<String>,
    pub conditions_list: Option<Vec<String>>,
    pub is_default: Option<bool>,
}

/// A person whose health the account manages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct HealthProfile {
    pub id: i64,
    pub user_id: i64,
    pub profile_name: String,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub conditions_text: Option<String>,
    /// Standardized conditions plus `conditions_list`
    #[cfg_attr(feature = "with-api", schema(value_type = Object))]
    pub conditions_json: Value,
    pub is_default: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl HealthProfile {
    /// Conditions chosen from the list, if any
    pub fn conditions_list(&self) -> Vec<String> {
        self.conditions_json
            .get("conditions_list")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}
