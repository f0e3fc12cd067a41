use std::sync::Arc;

use tracing::{info, warn};
use validator::Validate;

use health_food_data::models::{NewHealthProfile, NewUser, NewUserSession, UserRecord};
use health_food_data::repository::{normalize_email, HealthProfileRepositoryTrait, UserRepositoryTrait};

use crate::auth::logging::{log_auth_event, log_failed_login, log_logout, AuthEvent, AuthEventType};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::{generate_token, hash_token, validate_token};
use crate::auth::{CurrentUser, ROLE_ADMIN, ROLE_USER};
use crate::config::{AdminConfig, AuthConfig};
use crate::entities::{AccountOverview, AccountUser, AuthSession, Registration};
use crate::errors::{ServiceError, ServiceResult};

/// Name of the profile every new account starts with
pub const PRIMARY_PROFILE_NAME: &str = "Primary profile";

const ADMIN_PROFILE_NAME: &str = "Admin Profile";
const BAD_CREDENTIALS: &str = "Incorrect email or password";

/// Registration, login and bearer-token sessions
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepositoryTrait>,
    profiles: Arc<dyn HealthProfileRepositoryTrait>,
    config: AuthConfig,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepositoryTrait>,
        profiles: Arc<dyn HealthProfileRepositoryTrait>,
        config: AuthConfig,
    ) -> Self {
        Self { users, profiles, config }
    }

    /// Create an account with a default profile and sign it in
    pub async fn register(&self, registration: Registration) -> ServiceResult<AuthSession> {
        registration.validate()?;

        let email = normalize_email(&registration.email);
        if self.users.get_by_email(&email).await?.is_some() {
            log_auth_event(
                AuthEvent::new(AuthEventType::Registration, Some(&email), false)
                    .with_details("email already registered"),
            );
            return Err(ServiceError::Validation("Email is already registered".to_string()));
        }

        let user = self
            .users
            .create(NewUser {
                email,
                password_hash: hash_password(&registration.password)?,
                full_name: registration.full_name.trim().to_string(),
                role: ROLE_USER.to_string(),
            })
            .await?;

        let profile = self
            .profiles
            .create(NewHealthProfile {
                user_id: user.id,
                profile_name: PRIMARY_PROFILE_NAME.to_string(),
                is_default: true,
                ..Default::default()
            })
            .await?;

        let session = self.issue_session(&user, Some(profile.id)).await?;
        log_auth_event(
            AuthEvent::new(AuthEventType::Registration, Some(&user.id.to_string()), true)
                .with_auth_method("password"),
        );
        Ok(session)
    }

    /// Check credentials and issue a token
    ///
    /// Unknown emails and wrong passwords get the same answer.
    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<AuthSession> {
        let email = normalize_email(email);

        let user = match self.users.get_by_email(&email).await? {
            Some(user) if verify_password(password, &user.password_hash) => user,
            Some(_) => {
                log_failed_login(&email, "wrong password");
                return Err(ServiceError::Unauthorized(BAD_CREDENTIALS.to_string()));
            }
            None => {
                log_failed_login(&email, "unknown email");
                return Err(ServiceError::Unauthorized(BAD_CREDENTIALS.to_string()));
            }
        };

        self.users.record_login(user.id).await?;
        let default_profile_id = self.profiles.get_default(user.id).await?.map(|p| p.id);

        let session = self.issue_session(&user, default_profile_id).await?;
        log_auth_event(
            AuthEvent::new(AuthEventType::Login, Some(&user.id.to_string()), true).with_auth_method("password"),
        );
        Ok(session)
    }

    /// Revoke the caller's token
    pub async fn logout(&self, user: &CurrentUser) -> ServiceResult<()> {
        if !self.users.delete_session(&hash_token(&user.token)).await? {
            warn!("Logout for user {} found no live session", user.id);
        }
        log_logout(user.id);
        Ok(())
    }

    /// The caller's account with profile counts
    pub async fn me(&self, user: &CurrentUser) -> ServiceResult<AccountOverview> {
        let record = self
            .users
            .get_by_id(user.id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

        let profiles_count = self.profiles.count_for_user(record.id).await?;
        let default_profile_id = self.profiles.get_default(record.id).await?.map(|p| p.id);

        Ok(AccountOverview {
            id: record.id,
            email: record.email,
            full_name: record.full_name,
            role: record.role,
            last_login_at: record.last_login_at,
            profiles_count,
            default_profile_id,
        })
    }

    /// Resolve a bearer token to the active user behind it
    pub async fn authenticate(&self, token: &str) -> ServiceResult<CurrentUser> {
        let claims = validate_token(token, &self.config).map_err(|e| ServiceError::Unauthorized(e.to_string()))?;

        if self.users.find_session(&hash_token(token)).await?.is_none() {
            return Err(ServiceError::Unauthorized("Token has been revoked".to_string()));
        }

        let user_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| ServiceError::Unauthorized("Invalid token subject".to_string()))?;

        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("User not found".to_string()))?;

        Ok(CurrentUser {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            token: token.to_string(),
        })
    }

    /// Create the administrator account on first start
    ///
    /// Returns whether an account was created.
    pub async fn ensure_default_admin(&self, admin: &AdminConfig) -> ServiceResult<bool> {
        let email = normalize_email(&admin.email);
        if self.users.get_by_email(&email).await?.is_some() {
            return Ok(false);
        }

        let user = self
            .users
            .create(NewUser {
                email: email.clone(),
                password_hash: hash_password(&admin.password)?,
                full_name: admin.full_name.clone(),
                role: ROLE_ADMIN.to_string(),
            })
            .await?;

        self.profiles
            .create(NewHealthProfile {
                user_id: user.id,
                profile_name: ADMIN_PROFILE_NAME.to_string(),
                is_default: true,
                ..Default::default()
            })
            .await?;

        info!("Created default admin account {}", email);
        Ok(true)
    }

    async fn issue_session(&self, user: &UserRecord, default_profile_id: Option<i64>) -> ServiceResult<AuthSession> {
        let issued = generate_token(user.id, &user.role, &self.config)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        self.users
            .create_session(NewUserSession {
                user_id: user.id,
                token_hash: hash_token(&issued.token),
                expires_at: issued.expires_at_rfc3339(),
                device_info: None,
                ip_address: None,
            })
            .await?;

        Ok(AuthSession {
            expires_at: issued.expires_at_rfc3339(),
            token: issued.token,
            token_type: "bearer".to_string(),
            user: AccountUser {
                id: user.id,
                email: user.email.clone(),
                full_name: user.full_name.clone(),
                role: user.role.clone(),
                default_profile_id,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use health_food_data::repository::testing::test_pool;
    use health_food_data::repository::{HealthProfileRepository, UserRepository};

    fn service() -> AccountService {
        let pool = test_pool();
        AccountService::new(
            Arc::new(UserRepository::new(pool.clone())),
            Arc::new(HealthProfileRepository::new(pool)),
            AuthConfig::default(),
        )
    }

    fn registration(email: &str) -> Registration {
        Registration {
            email: email.to_string(),
            password: "secret123".to_string(),
            full_name: "Lan Nguyen".to_string(),
        }
    }

    #[tokio::test]
    async fn register_creates_default_profile_and_session() {
        let accounts = service();
        let session = accounts.register(registration("Lan@Example.com")).await.unwrap();

        assert_eq!(session.user.email, "lan@example.com");
        assert_eq!(session.user.role, ROLE_USER);
        assert!(session.user.default_profile_id.is_some());
        assert_eq!(session.token_type, "bearer");

        let user = accounts.authenticate(&session.token).await.unwrap();
        assert_eq!(user.id, session.user.id);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let accounts = service();
        accounts.register(registration("lan@example.com")).await.unwrap();

        let err = accounts.register(registration("LAN@example.com")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let accounts = service();
        let mut input = registration("lan@example.com");
        input.password = "123".to_string();

        let err = accounts.register(input).await.unwrap_err();
        assert!(err.to_string().contains("password"));
    }

    #[tokio::test]
    async fn login_checks_password() {
        let accounts = service();
        accounts.register(registration("lan@example.com")).await.unwrap();

        let session = accounts.login("lan@example.com", "secret123").await.unwrap();
        assert!(session.user.default_profile_id.is_some());

        let wrong = accounts.login("lan@example.com", "nope").await.unwrap_err();
        let unknown = accounts.login("who@example.com", "secret123").await.unwrap_err();
        assert_eq!(wrong.to_string(), unknown.to_string());
        assert!(matches!(wrong, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn logout_revokes_token() {
        let accounts = service();
        let session = accounts.register(registration("lan@example.com")).await.unwrap();
        let user = accounts.authenticate(&session.token).await.unwrap();

        accounts.logout(&user).await.unwrap();

        let err = accounts.authenticate(&session.token).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn me_reports_profiles_and_last_login() {
        let accounts = service();
        accounts.register(registration("lan@example.com")).await.unwrap();
        let session = accounts.login("lan@example.com", "secret123").await.unwrap();
        let user = accounts.authenticate(&session.token).await.unwrap();

        let overview = accounts.me(&user).await.unwrap();
        assert_eq!(overview.profiles_count, 1);
        assert!(overview.last_login_at.is_some());
        assert_eq!(overview.default_profile_id, session.user.default_profile_id);
    }

    #[tokio::test]
    async fn default_admin_is_created_once() {
        let accounts = service();
        let admin = AdminConfig::default();

        assert!(accounts.ensure_default_admin(&admin).await.unwrap());
        assert!(!accounts.ensure_default_admin(&admin).await.unwrap());

        let session = accounts.login(&admin.email, &admin.password).await.unwrap();
        assert_eq!(session.user.role, ROLE_ADMIN);
    }

    #[tokio::test]
    async fn garbage_token_is_unauthorized() {
        let accounts = service();
        let err = accounts.authenticate("not.a.token").await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }
}
