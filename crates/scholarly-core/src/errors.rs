use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

/// Message returned to clients for any 5xx response. The underlying cause is
/// logged, never echoed.
pub const INTERNAL_ERROR_MESSAGE: &str = "An error occurred while processing the request";

/// Body shape of every error response: `{"error": "..."}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// An HTTP status paired with its cause. Handlers return
/// `Result<_, AppError>` and let `?` do the rest.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
}

macro_rules! with_status {
    ($($(#[$doc:meta])* $name:ident => $status:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name<E: Into<Error>>(err: E) -> Self {
                Self::new(StatusCode::$status, err)
            }
        )*
    };
}

impl AppError {
    pub fn new<E: Into<Error>>(status: StatusCode, err: E) -> Self {
        Self {
            status,
            error: err.into(),
        }
    }

    with_status! {
        internal => INTERNAL_SERVER_ERROR,
        /// A query that failed for reasons other than a missing row.
        database => INTERNAL_SERVER_ERROR,
        not_found => NOT_FOUND,
        /// Duplicates and conflicting references.
        bad_request => BAD_REQUEST,
        unprocessable => UNPROCESSABLE_ENTITY,
        forbidden => FORBIDDEN,
    }

    fn client_message(&self) -> String {
        if self.status.is_server_error() {
            tracing::error!(status = self.status.as_u16(), error = ?self.error, "Request failed");
            INTERNAL_ERROR_MESSAGE.to_owned()
        } else {
            self.error.to_string()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.client_message(),
        };
        (self.status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}
