use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// A food in the nutrition database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Food {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    /// Nutrient name to amount
    #[cfg_attr(feature = "with-api", schema(value_type = Object))]
    pub nutrients: Value,
    #[cfg_attr(feature = "with-api", schema(value_type = Vec<String>))]
    pub contraindications: Value,
    #[cfg_attr(feature = "with-api", schema(value_type = Vec<String>))]
    pub benefits: Value,
    #[cfg_attr(feature = "with-api", schema(value_type = Object))]
    pub recommended_portions: Value,
    pub preparation_notes: Option<String>,
    pub source_reliability: String,
    pub created_by: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

/// New food data
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct FoodInput {
    #[validate(length(min = 1, message = "Food name is required"))]
    pub name: String,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub nutrients: Option<Value>,
    pub contraindications: Option<Vec<String>>,
    pub benefits: Option<Vec<String>>,
    pub recommended_portions: Option<Value>,
    pub preparation_notes: Option<String>,
    pub source_reliability: Option<String>,
}

/// Partial food update
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct FoodUpdate {
    #[validate(length(min = 1, message = "Food name cannot be empty"))]
    pub name: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub nutrients: Option<Value>,
    pub contraindications: Option<Vec<String>>,
    pub benefits: Option<Vec<String>>,
    pub recommended_portions: Option<Value>,
    pub preparation_notes: Option<String>,
    pub source_reliability: Option<String>,
}

/// Listing filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoodQuery {
    pub query: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}
