use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use health_food_domain::entities::{ProfileInput, ProfileUpdate};

/// New health profile
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicProfileRequest {
    pub profile_name: String,
    /// 0 to 120
    pub age: Option<i64>,
    /// `male`, `female` or `other`
    pub gender: Option<String>,
    /// Kilograms
    pub weight: Option<f64>,
    /// Centimetres
    pub height: Option<f64>,
    /// Free-text medical history
    #[serde(default)]
    pub conditions_text: Option<String>,
    pub conditions_list: Option<Vec<String>>,
    #[serde(default)]
    pub is_default: bool,
}

impl From<PublicProfileRequest> for ProfileInput {
    fn from(request: PublicProfileRequest) -> Self {
        ProfileInput {
            profile_name: request.profile_name,
            age: request.age,
            gender: request.gender,
            weight: request.weight,
            height: request.height,
            conditions_text: request.conditions_text,
            conditions_list: request.conditions_list,
            is_default: request.is_default,
        }
    }
}

/// Partial profile update; omitted fields are left alone
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PublicProfileUpdateRequest {
    pub profile_name: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub conditions_text: Option<String>,
    pub conditions_list: Option<Vec<String>>,
    pub is_default: Option<bool>,
}

impl From<PublicProfileUpdateRequest> for ProfileUpdate {
    fn from(request: PublicProfileUpdateRequest) -> Self {
        ProfileUpdate {
            profile_name: request.profile_name,
            age: request.age,
            gender: request.gender,
            weight: request.weight,
            height: request.height,
            conditions_text: request.conditions_text,
            conditions_list: request.conditions_list,
            is_default: request.is_default,
        }
    }
}
