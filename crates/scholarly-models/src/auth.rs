use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[serde(deserialize_with = "crate::common::trimmed")]
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Returned by login and both registration endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub message: String,
}

impl AuthResponse {
    pub fn new(token: String, message: impl Into<String>) -> Self {
        Self {
            success: true,
            token,
            message: message.into(),
        }
    }
}
