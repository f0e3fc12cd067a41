use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::warn;
use validator::Validate;

use health_food_data::models::{HealthProfileChanges, NewHealthProfile};
use health_food_data::repository::HealthProfileRepositoryTrait;

use crate::ai::prompts::standardize_conditions;
use crate::ai::ChatModel;
use crate::entities::conversions::convert_to_domain_profile;
use crate::entities::{HealthProfile, ProfileInput, ProfileUpdate};
use crate::errors::{ServiceError, ServiceResult};

use super::owned_profile;

const GENDERS: [&str; 3] = ["male", "female", "other"];

/// Health profiles owned by an account
#[derive(Clone)]
pub struct ProfileService {
    profiles: Arc<dyn HealthProfileRepositoryTrait>,
    model: Arc<dyn ChatModel>,
    language: String,
}

impl ProfileService {
    pub fn new(profiles: Arc<dyn HealthProfileRepositoryTrait>, model: Arc<dyn ChatModel>, language: String) -> Self {
        Self {
            profiles,
            model,
            language,
        }
    }

    pub async fn create(&self, user_id: i64, input: ProfileInput) -> ServiceResult<HealthProfile> {
        input.validate()?;
        check_measurements(input.gender.as_deref(), input.weight, input.height)?;

        let conditions_text = input
            .conditions_text
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        let mut conditions = match &conditions_text {
            Some(text) => self.standardize(text).await,
            None => json!({}),
        };
        if let Some(list) = input.conditions_list {
            set_conditions_list(&mut conditions, list);
        }

        let record = self
            .profiles
            .create(NewHealthProfile {
                user_id,
                profile_name: input.profile_name.trim().to_string(),
                age: input.age,
                gender: input.gender,
                weight: input.weight,
                height: input.height,
                conditions_text,
                conditions_json: Some(conditions),
                is_default: input.is_default,
            })
            .await?;

        Ok(convert_to_domain_profile(record))
    }

    pub async fn list(&self, user_id: i64) -> ServiceResult<Vec<HealthProfile>> {
        let records = self.profiles.list_for_user(user_id).await?;
        Ok(records.into_iter().map(convert_to_domain_profile).collect())
    }

    pub async fn get(&self, profile_id: i64, user_id: i64) -> ServiceResult<HealthProfile> {
        let record = owned_profile(self.profiles.as_ref(), profile_id, user_id).await?;
        Ok(convert_to_domain_profile(record))
    }

    /// Partial update
    ///
    /// New non-empty condition text is standardized again. A condition list
    /// is merged into whatever condition JSON the profile ends up with.
    pub async fn update(&self, profile_id: i64, user_id: i64, update: ProfileUpdate) -> ServiceResult<HealthProfile> {
        update.validate()?;
        check_measurements(update.gender.as_deref(), update.weight, update.height)?;

        let current = owned_profile(self.profiles.as_ref(), profile_id, user_id).await?;

        let mut conditions_json = match update.conditions_text.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => Some(self.standardize(text).await),
            _ => None,
        };
        if let Some(list) = update.conditions_list {
            let mut merged = conditions_json.take().unwrap_or(current.conditions_json);
            set_conditions_list(&mut merged, list);
            conditions_json = Some(merged);
        }

        let changes = HealthProfileChanges {
            profile_name: update.profile_name.map(|name| name.trim().to_string()),
            age: update.age,
            gender: update.gender,
            weight: update.weight,
            height: update.height,
            conditions_text: update.conditions_text,
            conditions_json,
            is_default: update.is_default,
        };
        if changes.is_empty() {
            return Err(ServiceError::Validation("No fields to update".to_string()));
        }

        let record = self
            .profiles
            .update(profile_id, user_id, changes)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Profile not found".to_string()))?;
        Ok(convert_to_domain_profile(record))
    }

    /// Delete a profile; the last one an account has cannot go
    pub async fn delete(&self, profile_id: i64, user_id: i64) -> ServiceResult<()> {
        owned_profile(self.profiles.as_ref(), profile_id, user_id).await?;

        if self.profiles.count_for_user(user_id).await? <= 1 {
            return Err(ServiceError::Validation("Cannot delete the last profile".to_string()));
        }

        if !self.profiles.delete(profile_id, user_id).await? {
            return Err(ServiceError::NotFound("Profile not found".to_string()));
        }
        Ok(())
    }

    async fn standardize(&self, text: &str) -> Value {
        match standardize_conditions(self.model.as_ref(), text, &self.language).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Condition standardization failed: {}", e);
                json!({ "raw_text": text, "error": e.to_string() })
            }
        }
    }
}

fn check_measurements(gender: Option<&str>, weight: Option<f64>, height: Option<f64>) -> ServiceResult<()> {
    if let Some(gender) = gender {
        if !GENDERS.contains(&gender) {
            return Err(ServiceError::Validation(
                "gender: Gender must be male, female or other".to_string(),
            ));
        }
    }
    if weight.is_some_and(|w| w <= 0.0) {
        return Err(ServiceError::Validation("weight: Weight must be positive".to_string()));
    }
    if height.is_some_and(|h| h <= 0.0) {
        return Err(ServiceError::Validation("height: Height must be positive".to_string()));
    }
    Ok(())
}

fn set_conditions_list(conditions: &mut Value, list: Vec<String>) {
    if !conditions.is_object() {
        *conditions = Value::Object(Map::new());
    }
    if let Value::Object(map) = conditions {
        map.insert("conditions_list".to_string(), json!(list));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AiError, ChatMessage, MockChatModel};
    use health_food_data::repository::testing::{insert_profile, insert_user, test_pool};
    use health_food_data::repository::HealthProfileRepository;

    fn service_with(model: MockChatModel) -> (ProfileService, i64) {
        let pool = test_pool();
        let user_id = insert_user(&pool, "lan@example.com");
        let service = ProfileService::new(
            Arc::new(HealthProfileRepository::new(pool)),
            Arc::new(model),
            "English".to_string(),
        );
        (service, user_id)
    }

    fn offline_model() -> MockChatModel {
        let mut model = MockChatModel::new();
        model.expect_complete().returning(|_| Err(AiError::NotConfigured));
        model
    }

    #[tokio::test]
    async fn create_standardizes_conditions() {
        let mut model = MockChatModel::new();
        model.expect_complete().times(1).returning(|_| {
            Ok(ChatMessage::assistant(
                r#"{"conditions":["type 2 diabetes"],"allergies":[],"medications":[],"notes":""}"#,
            ))
        });
        let (service, user_id) = service_with(model);

        let profile = service
            .create(
                user_id,
                ProfileInput {
                    profile_name: "Dad".to_string(),
                    conditions_text: Some("diabetes type 2".to_string()),
                    conditions_list: Some(vec!["diabetes".to_string()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(profile.conditions_json["conditions"], json!(["type 2 diabetes"]));
        assert_eq!(profile.conditions_list(), vec!["diabetes"]);
    }

    #[tokio::test]
    async fn ai_failure_keeps_raw_text() {
        let (service, user_id) = service_with(offline_model());

        let profile = service
            .create(
                user_id,
                ProfileInput {
                    profile_name: "Mom".to_string(),
                    conditions_text: Some("high blood pressure".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(profile.conditions_json["raw_text"], "high blood pressure");
        assert!(profile.conditions_json.get("error").is_some());
    }

    #[tokio::test]
    async fn invalid_measurements_are_rejected() {
        let (service, user_id) = service_with(MockChatModel::new());

        let bad_gender = ProfileInput {
            profile_name: "X".to_string(),
            gender: Some("robot".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            service.create(user_id, bad_gender).await,
            Err(ServiceError::Validation(_))
        ));

        let bad_age = ProfileInput {
            profile_name: "X".to_string(),
            age: Some(130),
            ..Default::default()
        };
        assert!(service.create(user_id, bad_age).await.unwrap_err().to_string().contains("age"));

        let bad_weight = ProfileInput {
            profile_name: "X".to_string(),
            weight: Some(0.0),
            ..Default::default()
        };
        assert!(service.create(user_id, bad_weight).await.is_err());
    }

    #[tokio::test]
    async fn duplicate_name_conflicts() {
        let (service, user_id) = service_with(MockChatModel::new());
        let input = ProfileInput {
            profile_name: "Me".to_string(),
            ..Default::default()
        };

        service.create(user_id, input.clone()).await.unwrap();
        assert!(matches!(
            service.create(user_id, input).await,
            Err(ServiceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn update_merges_condition_list_into_existing_json() {
        let mut model = MockChatModel::new();
        model
            .expect_complete()
            .times(1)
            .returning(|_| Ok(ChatMessage::assistant(r#"{"conditions":["gout"]}"#)));
        let (service, user_id) = service_with(model);

        let profile = service
            .create(
                user_id,
                ProfileInput {
                    profile_name: "Me".to_string(),
                    conditions_text: Some("gout".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let updated = service
            .update(
                profile.id,
                user_id,
                ProfileUpdate {
                    conditions_list: Some(vec!["gout".to_string(), "anemia".to_string()]),
                    weight: Some(61.5),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.conditions_json["conditions"], json!(["gout"]));
        assert_eq!(updated.conditions_list(), vec!["gout", "anemia"]);
        assert_eq!(updated.weight, Some(61.5));
    }

    #[tokio::test]
    async fn empty_update_is_rejected() {
        let (service, user_id) = service_with(MockChatModel::new());
        let profile = service
            .create(
                user_id,
                ProfileInput {
                    profile_name: "Me".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let err = service.update(profile.id, user_id, ProfileUpdate::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn other_users_profiles_are_not_found() {
        let pool = test_pool();
        let owner = insert_user(&pool, "owner@example.com");
        let stranger = insert_user(&pool, "stranger@example.com");
        let profile_id = insert_profile(&pool, owner, "Private");
        let service = ProfileService::new(
            Arc::new(HealthProfileRepository::new(pool)),
            Arc::new(MockChatModel::new()),
            "English".to_string(),
        );

        assert!(matches!(
            service.get(profile_id, stranger).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.delete(profile_id, stranger).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn last_profile_cannot_be_deleted() {
        let pool = test_pool();
        let user_id = insert_user(&pool, "lan@example.com");
        let first = insert_profile(&pool, user_id, "First");
        let second = insert_profile(&pool, user_id, "Second");
        let service = ProfileService::new(
            Arc::new(HealthProfileRepository::new(pool)),
            Arc::new(MockChatModel::new()),
            "English".to_string(),
        );

        service.delete(second, user_id).await.unwrap();
        let err = service.delete(first, user_id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
