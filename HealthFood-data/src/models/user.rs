use serde::{Deserialize, Serialize};

/// Stored user account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
    pub is_active: bool,
    pub last_login_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Input for creating a user account
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Normalized (trimmed, lower-cased) by the repository
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
}

/// A login session bound to an issued token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSessionRecord {
    pub id: i64,
    pub user_id: i64,
    pub token_hash: String,
    pub expires_at: String,
    pub created_at: String,
}

/// Input for recording a login session
#[derive(Debug, Clone)]
pub struct NewUserSession {
    pub user_id: i64,
    pub token_hash: String,
    pub expires_at: String,
    pub device_info: Option<String>,
    pub ip_address: Option<String>,
}
