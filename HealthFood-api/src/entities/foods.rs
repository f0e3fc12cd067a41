use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use health_food_domain::entities::{FoodInput, FoodQuery, FoodUpdate};

/// Query parameters for the food listing
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct FoodListParams {
    /// Matches name, category or subcategory
    pub query: Option<String>,
    /// Maximum number of results (default: 50, max: 200)
    pub limit: Option<u32>,
    /// Pagination offset (default: 0)
    pub offset: Option<u32>,
}

impl From<FoodListParams> for FoodQuery {
    fn from(params: FoodListParams) -> Self {
        FoodQuery {
            query: params.query,
            limit: params.limit,
            offset: params.offset,
        }
    }
}

/// Food data sent by administrators
///
/// Creation requires `name`; on update every omitted field is kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PublicFoodRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub nutrients: Option<Value>,
    pub contraindications: Option<Vec<String>>,
    pub benefits: Option<Vec<String>>,
    #[schema(value_type = Option<Object>)]
    pub recommended_portions: Option<Value>,
    pub preparation_notes: Option<String>,
    /// `verified`, `ai_generated` or `user_submitted`
    pub source_reliability: Option<String>,
}

impl From<PublicFoodRequest> for FoodInput {
    fn from(request: PublicFoodRequest) -> Self {
        FoodInput {
            name: request.name.unwrap_or_default(),
            category: request.category,
            subcategory: request.subcategory,
            nutrients: request.nutrients,
            contraindications: request.contraindications,
            benefits: request.benefits,
            recommended_portions: request.recommended_portions,
            preparation_notes: request.preparation_notes,
            source_reliability: request.source_reliability,
        }
    }
}

impl From<PublicFoodRequest> for FoodUpdate {
    fn from(request: PublicFoodRequest) -> Self {
        FoodUpdate {
            name: request.name,
            category: request.category,
            subcategory: request.subcategory,
            nutrients: request.nutrients,
            contraindications: request.contraindications,
            benefits: request.benefits,
            recommended_portions: request.recommended_portions,
            preparation_notes: request.preparation_notes,
            source_reliability: request.source_reliability,
        }
    }
}
