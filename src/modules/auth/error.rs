use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use scholarly_auth::TokenError;
use scholarly_core::AppError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials: Incorrect email or password.")]
    InvalidCredentials,

    #[error("{0}")]
    AlreadyExists(String),

    #[error("Token subject no longer exists")]
    PrincipalNotFound,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Internal(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials
            | AuthError::PrincipalNotFound
            | AuthError::Token(_) => StatusCode::UNAUTHORIZED,
            AuthError::AlreadyExists(_) => StatusCode::BAD_REQUEST,
            AuthError::Database(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converts into an [`AppError`] keeping the status. `?` alone would
    /// turn every variant into a 500.
    pub fn into_app_error(self) -> AppError {
        AppError::new(self.status_code(), self)
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.error.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.into_app_error().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(
            AuthError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::AlreadyExists("taken".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::PrincipalNotFound.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::Token(TokenError::Expired("x".into())).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::Database(sqlx::Error::PoolTimedOut).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn token_errors_keep_their_message() {
        let err = AuthError::from(TokenError::BadSignature("mismatch".into()));
        assert_eq!(err.to_string(), "Invalid signature: mismatch");
    }

    #[test]
    fn app_error_keeps_status() {
        let err = AuthError::InvalidCredentials.into_app_error();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }
}
