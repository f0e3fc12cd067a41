//! Authentication for the HealthFood API
//!
//! Bearer JWTs backed by a session table, so logging out revokes a token
//! before it expires.

use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

pub mod logging;
pub mod password;
pub mod token;

#[cfg(feature = "with-axum")]
pub mod authorize;

#[cfg(feature = "with-axum")]
mod middleware;

#[cfg(feature = "with-axum")]
pub use middleware::auth_middleware;

#[cfg(feature = "with-web")]
pub use middleware::configure_security;

/// Role given to self-registered accounts
pub const ROLE_USER: &str = "user";

/// Role allowed to manage foods and read system stats
pub const ROLE_ADMIN: &str = "admin";

/// Authentication claims for JSON Web Tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// Role at the time the token was issued
    pub role: String,
    /// Issuer
    pub iss: String,
    /// Issued at (as timestamp)
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Unique token id
    pub jti: String,
}

/// The authenticated caller, placed in request extensions by `auth_middleware`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub role: String,
    /// Raw bearer token, kept so logout can revoke it
    #[serde(skip)]
    pub token: String,
}
