use std::sync::Arc;

use health_food_data::repository::StatsRepositoryTrait;

use crate::entities::conversions::{convert_to_domain_system_stats, convert_to_domain_user_stats};
use crate::entities::{SystemStatistics, UserStatistics};
use crate::errors::ServiceResult;

#[derive(Clone)]
pub struct StatsService {
    stats: Arc<dyn StatsRepositoryTrait>,
}

impl StatsService {
    pub fn new(stats: Arc<dyn StatsRepositoryTrait>) -> Self {
        Self { stats }
    }

    /// Totals across every account, for administrators
    pub async fn system(&self) -> ServiceResult<SystemStatistics> {
        Ok(convert_to_domain_system_stats(self.stats.system_stats().await?))
    }

    pub async fn user(&self, user_id: i64) -> ServiceResult<UserStatistics> {
        Ok(convert_to_domain_user_stats(self.stats.user_stats(user_id).await?))
    }
}
