use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Row counts across the whole system
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct SystemStatistics {
    pub users: i64,
    pub health_profiles: i64,
    pub documents: i64,
    pub foods: i64,
    pub chat_sessions: i64,
    pub chat_messages: i64,
    pub health_plans: i64,
}

/// Row counts owned by one account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct UserStatistics {
    pub profiles: i64,
    pub documents: i64,
    pub chat_sessions: i64,
    pub health_plans: i64,
}
