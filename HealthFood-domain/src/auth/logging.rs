use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Types of authentication events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthEventType {
    /// Account created
    Registration,
    /// Successful password login
    Login,
    /// Failed password login
    FailedLogin,
    /// Session ended by the user
    Logout,
    /// Bearer token checked by the middleware
    TokenValidation,
    /// Role check failed
    AccessDenied,
}

impl AuthEventType {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthEventType::Registration => "registration",
            AuthEventType::Login => "login",
            AuthEventType::FailedLogin => "failed_login",
            AuthEventType::Logout => "logout",
            AuthEventType::TokenValidation => "token_validation",
            AuthEventType::AccessDenied => "access_denied",
        }
    }
}

impl std::fmt::Display for AuthEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authentication event record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthEvent {
    pub event_type: AuthEventType,
    /// User id or the email used in the attempt
    pub subject: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub details: Option<String>,
    /// Request path, when the event came from a request
    pub resource: Option<String>,
    pub duration_ms: Option<u64>,
    pub auth_method: Option<String>,
}

impl AuthEvent {
    pub fn new(event_type: AuthEventType, subject: Option<&str>, success: bool) -> Self {
        Self {
            event_type,
            subject: subject.map(String::from),
            timestamp: Utc::now(),
            success,
            details: None,
            resource: None,
            duration_ms: None,
            auth_method: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_auth_method(mut self, auth_method: impl Into<String>) -> Self {
        self.auth_method = Some(auth_method.into());
        self
    }
}

/// Emit an authentication event on the `auth` target, failures at warn level
pub fn log_auth_event(event: AuthEvent) {
    let subject = event.subject.as_deref().unwrap_or("anonymous");
    let resource = event.resource.as_deref().unwrap_or("-");
    let method = event.auth_method.as_deref().unwrap_or("-");
    let details = event.details.as_deref().unwrap_or("");
    let at = event.timestamp.to_rfc3339();

    if event.success {
        info!(
            target: "auth",
            event = event.event_type.as_str(),
            subject,
            resource,
            method,
            duration_ms = event.duration_ms,
            at = %at,
            "{}", details
        );
    } else {
        warn!(
            target: "auth",
            event = event.event_type.as_str(),
            subject,
            resource,
            method,
            duration_ms = event.duration_ms,
            at = %at,
            "{}", details
        );
    }
}

/// Log a failed login attempt
pub fn log_failed_login(email: &str, reason: &str) {
    let event = AuthEvent::new(AuthEventType::FailedLogin, Some(email), false)
        .with_details(reason)
        .with_auth_method("password");
    log_auth_event(event);
}

/// Log a logout
pub fn log_logout(user_id: i64) {
    let event = AuthEvent::new(AuthEventType::Logout, Some(&user_id.to_string()), true);
    log_auth_event(event);
}

/// Log a role check that failed
pub fn log_access_denied(user_id: i64, resource: &str, required_role: &str) {
    let event = AuthEvent::new(AuthEventType::AccessDenied, Some(&user_id.to_string()), false)
        .with_resource(resource)
        .with_details(format!("Required role: {}", required_role))
        .with_auth_method("rbac");
    log_auth_event(event);
}
