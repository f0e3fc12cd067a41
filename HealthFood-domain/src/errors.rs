use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use health_food_data::repository::RepositoryError;

use crate::ai::AiError;

/// Errors returned by domain services
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input failed a business rule
    #[error("{0}")]
    Validation(String),

    /// Missing or bad credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed
    #[error("{0}")]
    Forbidden(String),

    /// Resource missing or not owned by the caller
    #[error("{0}")]
    NotFound(String),

    /// Resource already exists
    #[error("{0}")]
    Conflict(String),

    /// An external provider failed
    #[error("Upstream service error: {0}")]
    Upstream(String),

    /// A required external provider is not configured
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Storage failure
    #[error("Repository error: {0}")]
    Repository(String),

    /// Anything else
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => ServiceError::NotFound(msg),
            RepositoryError::Conflict(msg) => ServiceError::Conflict(msg),
            RepositoryError::Validation(msg) => ServiceError::Validation(msg),
            other => {
                error!("Repository failure: {}", other);
                ServiceError::Repository(other.to_string())
            }
        }
    }
}

impl From<AiError> for ServiceError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::NotConfigured => ServiceError::Unavailable("AI service is not configured".to_string()),
            other => ServiceError::Upstream(other.to_string()),
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        ServiceError::Validation(validation_message(&errors))
    }
}

/// Flatten validator errors into `field: message; field: message`
///
/// Fields are sorted so the message is stable.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| *field);

    fields
        .into_iter()
        .map(|(field, errors)| {
            let messages: Vec<String> = errors
                .iter()
                .map(|err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {}", field),
                })
                .collect();
            format!("{}: {}", field, messages.join(", "))
        })
        .collect::<Vec<String>>()
        .join("; ")
}

/// Result alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Registration;
    use validator::Validate;

    #[test]
    fn validation_errors_are_flattened_in_field_order() {
        let registration = Registration {
            email: "not-an-email".to_string(),
            password: "123".to_string(),
            full_name: "Ann".to_string(),
        };

        let err: ServiceError = registration.validate().unwrap_err().into();
        assert_eq!(
            err.to_string(),
            "email: Invalid email address; password: Password must be at least 6 characters"
        );
    }

    #[test]
    fn missing_rows_keep_their_meaning() {
        let err: ServiceError = RepositoryError::NotFound("Food 3".into()).into();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let err: ServiceError = AiError::NotConfigured.into();
        assert!(matches!(err, ServiceError::Unavailable(_)));
    }
}
