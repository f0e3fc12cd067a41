use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Self-service sign-up data
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Registration {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 2, message = "Full name must be at least 2 characters"))]
    pub full_name: String,
}

/// The account part of a login or registration answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct AccountUser {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub default_profile_id: Option<i64>,
}

/// A freshly issued bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct AuthSession {
    pub token: String,
    /// Always `bearer`
    pub token_type: String,
    pub expires_at: String,
    pub user: AccountUser,
}

/// The caller's account with profile counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct AccountOverview {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub last_login_at: Option<String>,
    pub profiles_count: i64,
    pub default_profile_id: Option<i64>,
}
