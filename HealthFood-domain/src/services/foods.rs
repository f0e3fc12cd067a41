use std::sync::Arc;

use serde_json::json;
use tracing::info;
use validator::Validate;

use health_food_data::models::{FoodChanges, NewFood};
use health_food_data::repository::FoodRepositoryTrait;

use crate::entities::conversions::convert_to_domain_food;
use crate::entities::{Food, FoodInput, FoodQuery, FoodUpdate};
use crate::errors::{ServiceError, ServiceResult};

pub const DEFAULT_FOOD_LIMIT: u32 = 50;
pub const MAX_FOOD_LIMIT: u32 = 200;

/// The shared nutrition database
#[derive(Clone)]
pub struct FoodService {
    foods: Arc<dyn FoodRepositoryTrait>,
}

impl FoodService {
    pub fn new(foods: Arc<dyn FoodRepositoryTrait>) -> Self {
        Self { foods }
    }

    pub async fn list(&self, query: FoodQuery) -> ServiceResult<Vec<Food>> {
        let limit = query.limit.unwrap_or(DEFAULT_FOOD_LIMIT).clamp(1, MAX_FOOD_LIMIT);
        let offset = query.offset.unwrap_or(0);
        let term = query.query.as_deref().map(str::trim).filter(|q| !q.is_empty());

        let records = self.foods.list(term, limit, offset).await?;
        Ok(records.into_iter().map(convert_to_domain_food).collect())
    }

    pub async fn get(&self, food_id: i64) -> ServiceResult<Food> {
        self.foods
            .get_by_id(food_id)
            .await?
            .map(convert_to_domain_food)
            .ok_or_else(|| not_found(food_id))
    }

    pub async fn create(&self, input: FoodInput, created_by: i64) -> ServiceResult<Food> {
        input.validate()?;

        let record = self
            .foods
            .create(NewFood {
                name: input.name.trim().to_string(),
                category: input.category,
                subcategory: input.subcategory,
                nutrients: input.nutrients,
                contraindications: input.contraindications.map(|items| json!(items)),
                benefits: input.benefits.map(|items| json!(items)),
                recommended_portions: input.recommended_portions,
                preparation_notes: input.preparation_notes,
                source_reliability: input.source_reliability,
                created_by: Some(created_by),
            })
            .await?;

        info!("Food {} created by user {}", record.id, created_by);
        Ok(convert_to_domain_food(record))
    }

    /// Change only the fields that are set
    pub async fn update(&self, food_id: i64, update: FoodUpdate) -> ServiceResult<Food> {
        update.validate()?;

        let changes = FoodChanges {
            name: update.name.map(|name| name.trim().to_string()),
            category: update.category,
            subcategory: update.subcategory,
            nutrients: update.nutrients,
            contraindications: update.contraindications.map(|items| json!(items)),
            benefits: update.benefits.map(|items| json!(items)),
            recommended_portions: update.recommended_portions,
            preparation_notes: update.preparation_notes,
            source_reliability: update.source_reliability,
        };

        self.foods
            .update(food_id, changes)
            .await?
            .map(convert_to_domain_food)
            .ok_or_else(|| not_found(food_id))
    }

    pub async fn delete(&self, food_id: i64) -> ServiceResult<()> {
        if !self.foods.delete(food_id).await? {
            return Err(not_found(food_id));
        }
        info!("Food {} deleted", food_id);
        Ok(())
    }
}

fn not_found(food_id: i64) -> ServiceError {
    ServiceError::NotFound(format!("Food {} not found", food_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use health_food_data::repository::testing::{insert_user, test_pool};
    use health_food_data::repository::FoodRepository;

    fn service() -> (FoodService, i64) {
        let pool = test_pool();
        let admin = insert_user(&pool, "admin@example.com");
        (FoodService::new(Arc::new(FoodRepository::new(pool))), admin)
    }

    fn food(name: &str, category: &str) -> FoodInput {
        FoodInput {
            name: name.to_string(),
            category: Some(category.to_string()),
            benefits: Some(vec!["fiber".to_string()]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_then_filter() {
        let (foods, admin) = service();
        foods.create(food("Brown rice", "Grain"), admin).await.unwrap();
        foods.create(food("Spinach", "Vegetable"), admin).await.unwrap();

        let all = foods.list(FoodQuery::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let vegetables = foods
            .list(FoodQuery {
                query: Some("vegetable".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(vegetables.len(), 1);
        assert_eq!(vegetables[0].name, "Spinach");
        assert_eq!(vegetables[0].benefits, json!(["fiber"]));
        assert_eq!(vegetables[0].created_by, Some(admin));
    }

    #[tokio::test]
    async fn duplicate_name_conflicts() {
        let (foods, admin) = service();
        foods.create(food("Tofu", "Protein"), admin).await.unwrap();

        let err = foods.create(food("Tofu", "Protein"), admin).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let (foods, admin) = service();
        let err = foods.create(food("", "Grain"), admin).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn update_is_partial() {
        let (foods, admin) = service();
        let created = foods.create(food("Oats", "Grain"), admin).await.unwrap();

        let updated = foods
            .update(
                created.id,
                FoodUpdate {
                    preparation_notes: Some("Soak overnight".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Oats");
        assert_eq!(updated.category.as_deref(), Some("Grain"));
        assert_eq!(updated.preparation_notes.as_deref(), Some("Soak overnight"));
    }

    #[tokio::test]
    async fn missing_food_is_not_found() {
        let (foods, _) = service();
        assert!(matches!(foods.get(42).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(foods.delete(42).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(
            foods.update(42, FoodUpdate::default()).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn limit_is_capped() {
        let (foods, admin) = service();
        for i in 0..3 {
            foods.create(food(&format!("Food {}", i), "Misc"), admin).await.unwrap();
        }

        let page = foods
            .list(FoodQuery {
                query: None,
                limit: Some(2),
                offset: Some(1),
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
    }
}
