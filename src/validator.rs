use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use scholarly_core::AppError;

/// Joins every rule message, ordered by field so responses are stable.
/// Struct-level rules report under `__all__` and carry their own message.
fn format_errors(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let mut messages = Vec::new();
    for (field, errors) in fields {
        for error in errors {
            match &error.message {
                Some(message) => messages.push(message.to_string()),
                None => messages.push(format!("{} is invalid", field)),
            }
        }
    }
    messages.join(", ")
}

fn missing_field(body_text: &str) -> Option<&str> {
    body_text
        .split("missing field `")
        .nth(1)
        .and_then(|rest| rest.split('`').next())
}

fn reject_body(rejection: JsonRejection) -> AppError {
    let body_text = rejection.body_text();

    let message = if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
        "Missing 'Content-Type: application/json' header".to_owned()
    } else if let Some(field) = missing_field(&body_text) {
        format!("{} is required", field)
    } else if body_text.contains("invalid type") || body_text.contains("invalid value") {
        "Invalid field type in request".to_owned()
    } else if matches!(rejection, JsonRejection::JsonSyntaxError(_)) {
        "Malformed JSON body".to_owned()
    } else {
        "Invalid request body".to_owned()
    };

    AppError::bad_request(anyhow!(message))
}

/// JSON body extractor that runs `validator` rules.
///
/// Body errors are 400, rule violations 422.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(reject_body)?;

        value
            .validate()
            .map_err(|errors| AppError::unprocessable(anyhow!(format_errors(&errors))))?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use scholarly_models::CreateReviewDto;

    fn request(content_type: Option<&str>, body: &str) -> Request {
        let mut builder = Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn extract(req: Request) -> Result<ValidatedJson<CreateReviewDto>, AppError> {
        ValidatedJson::<CreateReviewDto>::from_request(req, &()).await
    }

    #[tokio::test]
    async fn missing_field_is_named() {
        let err = extract(request(
            Some("application/json"),
            r#"{"comment":"ok","courseId":1,"studentId":1}"#,
        ))
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error.to_string(), "rating is required");
    }

    #[tokio::test]
    async fn rule_violation_is_unprocessable() {
        let err = extract(request(
            Some("application/json"),
            r#"{"comment":"ok","rating":9,"courseId":1,"studentId":1}"#,
        ))
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.error.to_string(), "rating must be between 1 and 5");
    }

    #[tokio::test]
    async fn missing_content_type_is_bad_request() {
        let err = extract(request(None, "{}")).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn valid_body_passes() {
        let ValidatedJson(dto) = extract(request(
            Some("application/json"),
            r#"{"comment":"ok","rating":4,"courseId":1,"studentId":2}"#,
        ))
        .await
        .unwrap();
        assert_eq!(dto.rating, 4);
        assert_eq!(dto.student_id, 2);
    }
}
