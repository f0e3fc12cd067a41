use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, error};

use crate::auth::Claims;
use crate::config::AuthConfig;

static TOKEN_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Security errors for authentication and token operations
#[derive(Debug, Error)]
pub enum SecurityError {
    /// JWT validation error
    #[error("Token validation error: {0}")]
    TokenValidation(String),

    /// Expired token
    #[error("Token has expired")]
    TokenExpired,

    /// Invalid token structure
    #[error("Invalid token format")]
    InvalidToken,

    /// Invalid issuer
    #[error("Invalid token issuer")]
    InvalidIssuer,

    /// Session was logged out or never existed
    #[error("Token has been revoked")]
    TokenRevoked,

    /// Token could not be signed
    #[error("Token signing failed: {0}")]
    Signing(String),
}

/// A signed token and the moment it stops being valid
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    /// Expiry in the storage timestamp format
    pub fn expires_at_rfc3339(&self) -> String {
        self.expires_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Sign an access token for a user
pub fn generate_token(user_id: i64, role: &str, config: &AuthConfig) -> Result<IssuedToken, SecurityError> {
    let now = Utc::now();
    let expires_at = now + Duration::minutes(config.token_ttl_minutes);

    let claims = Claims {
        sub: user_id.to_string(),
        role: role.to_string(),
        iss: config.issuer.clone(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
        jti: format!(
            "{}-{}",
            now.timestamp_micros(),
            TOKEN_COUNTER.fetch_add(1, Ordering::Relaxed)
        ),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| {
        error!("Failed to encode JWT token: {}", e);
        SecurityError::Signing(e.to_string())
    })?;

    debug!("Issued token for user {} expiring at {}", user_id, expires_at);

    Ok(IssuedToken { token, expires_at })
}

/// Check signature, issuer and expiry of a token
pub fn validate_token(token: &str, config: &AuthConfig) -> Result<Claims, SecurityError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[config.issuer.as_str()]);
    validation.leeway = 0;

    decode::<Claims>(token, &DecodingKey::from_secret(config.jwt_secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => SecurityError::TokenExpired,
            ErrorKind::InvalidIssuer => SecurityError::InvalidIssuer,
            ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                SecurityError::InvalidToken
            }
            _ => SecurityError::TokenValidation(e.to_string()),
        })
}

/// Hex SHA-256 of a token, the form sessions are stored under
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
