// Domain services
// Business rules over the repositories and the AI client.

pub mod accounts;
pub mod chat;
pub mod documents;
pub mod foods;
pub mod planner;
pub mod profiles;
pub mod schedule;
pub mod stats;

use std::sync::Arc;

use health_food_data::database::DatabasePool;
use health_food_data::models::HealthProfileRecord;
use health_food_data::repository::{
    ChatRepository, DocumentRepository, FoodRepository, HealthPlanRepository, HealthProfileRepository,
    HealthProfileRepositoryTrait, LogRepository, StatsRepository, UserRepository,
};

use crate::ai::ChatModel;
use crate::config::AppConfig;
use crate::errors::{ServiceError, ServiceResult};

// Re-export services
pub use accounts::AccountService;
pub use chat::{chat_tools, ChatService, ProfileToolExecutor};
pub use documents::DocumentService;
pub use foods::FoodService;
pub use planner::HealthPlanService;
pub use profiles::ProfileService;
pub use stats::StatsService;

/// Every service wired to one pool and one chat model
#[derive(Clone)]
pub struct Services {
    pub accounts: AccountService,
    pub profiles: ProfileService,
    pub documents: DocumentService,
    pub chat: ChatService,
    pub foods: FoodService,
    pub plans: HealthPlanService,
    pub stats: StatsService,
}

impl Services {
    pub fn new(pool: DatabasePool, config: &AppConfig, model: Arc<dyn ChatModel>) -> Self {
        let users = Arc::new(UserRepository::new(pool.clone()));
        let profiles = Arc::new(HealthProfileRepository::new(pool.clone()));
        let documents = Arc::new(DocumentRepository::new(pool.clone()));
        let chats = Arc::new(ChatRepository::new(pool.clone()));
        let foods = Arc::new(FoodRepository::new(pool.clone()));
        let plans = Arc::new(HealthPlanRepository::new(pool.clone()));
        let logs = Arc::new(LogRepository::new(pool.clone()));
        let stats = Arc::new(StatsRepository::new(pool));
        let language = config.ai.reply_language.clone();

        Self {
            accounts: AccountService::new(users, profiles.clone(), config.auth.clone()),
            profiles: ProfileService::new(profiles.clone(), model.clone(), language.clone()),
            documents: DocumentService::new(documents, profiles.clone(), model.clone(), language.clone()),
            chat: ChatService::new(chats, profiles.clone(), foods.clone(), model.clone(), language.clone()),
            foods: FoodService::new(foods),
            plans: HealthPlanService::new(plans, logs, profiles, model, language),
            stats: StatsService::new(stats),
        }
    }
}

/// The profile, if it belongs to the user
pub(crate) async fn owned_profile(
    profiles: &dyn HealthProfileRepositoryTrait,
    profile_id: i64,
    user_id: i64,
) -> ServiceResult<HealthProfileRecord> {
    profiles
        .get_for_user(profile_id, user_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Profile not found".to_string()))
}
