use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use health_food_domain::entities::Registration;

/// Registration request payload
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct PublicRegistrationRequest {
    /// Email address (must be valid format)
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    /// Password (at least 6 characters)
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    /// Full name (at least 2 characters)
    #[validate(length(min = 2, message = "Full name must be at least 2 characters"))]
    pub full_name: String,
}

impl From<PublicRegistrationRequest> for Registration {
    fn from(request: PublicRegistrationRequest) -> Self {
        Registration {
            email: request.email,
            password: request.password,
            full_name: request.full_name,
        }
    }
}

/// Login request payload
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct PublicLoginRequest {
    pub email: String,
    pub password: String,
}
