use serde::{Deserialize, Serialize};

/// Row counts across the whole system
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStats {
    pub users: i64,
    pub health_profiles: i64,
    pub documents: i64,
    pub foods: i64,
    pub chat_sessions: i64,
    pub chat_messages: i64,
    pub health_plans: i64,
}

/// Row counts owned by one user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub profiles: i64,
    pub documents: i64,
    pub chat_sessions: i64,
    pub health_plans: i64,
}
