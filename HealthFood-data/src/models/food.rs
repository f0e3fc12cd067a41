use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stored food entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodRecord {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    /// Object keyed by nutrient name
    pub nutrients: Value,
    /// List of conditions the food should be avoided with
    pub contraindications: Value,
    /// List of health benefits
    pub benefits: Value,
    /// Object keyed by portion context
    pub recommended_portions: Value,
    pub preparation_notes: Option<String>,
    pub source_reliability: String,
    pub created_by: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

/// Input for creating a food entry
#[derive(Debug, Clone, Default)]
pub struct NewFood {
    pub name: String,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub nutrients: Option<Value>,
    pub contraindications: Option<Value>,
    pub benefits: Option<Value>,
    pub recommended_portions: Option<Value>,
    pub preparation_notes: Option<String>,
    pub source_reliability: Option<String>,
    pub created_by: Option<i64>,
}

/// Partial update of a food entry
#[derive(Debug, Clone, Default)]
pub struct FoodChanges {
    pub name: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub nutrients: Option<Value>,
    pub contraindications: Option<Value>,
    pub benefits: Option<Value>,
    pub recommended_portions: Option<Value>,
    pub preparation_notes: Option<String>,
    pub source_reliability: Option<String>,
}
