use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stored health profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthProfileRecord {
    pub id: i64,
    pub user_id: i64,
    pub profile_name: String,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub conditions_text: Option<String>,
    /// Structured conditions; `{}` when nothing was recorded
    pub conditions_json: Value,
    pub is_default: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Input for creating a health profile
#[derive(Debug, Clone, Default)]
pub struct NewHealthProfile {
    pub user_id: i64,
    pub profile_name: String,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub conditions_text: Option<String>,
    pub conditions_json: Option<Value>,
    pub is_default: bool,
}

/// Partial update of a health profile; `None` leaves a column untouched
#[derive(Debug, Clone, Default)]
pub struct HealthProfileChanges {
    pub profile_name: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub conditions_text: Option<String>,
    pub conditions_json: Option<Value>,
    pub is_default: Option<bool>,
}

impl HealthProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.profile_name.is_none()
            && self.age.is_none()
            && self.gender.is_none()
            && self.weight.is_none()
            && self.height.is_none()
            && self.conditions_text.is_none()
            && self.conditions_json.is_none()
            && self.is_default.is_none()
    }
}
