//! Student records and request bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// A student as returned by the API. The password digest never leaves the
/// service layer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub bio: Option<String>,
    pub email: String,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body for student registration, creation and full update.
#[derive(Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentDto {
    #[validate(length(min = 1, max = 100, message = "name must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(range(min = 1, max = 150, message = "age must be between 1 and 150"))]
    pub age: i32,
    #[validate(custom(function = "crate::common::validate_gender", message = "gender must be MALE or FEMALE"))]
    pub gender: String,
    #[validate(length(max = 1000, message = "bio must be at most 1000 characters"))]
    pub bio: Option<String>,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, max = 30, message = "phoneNumber must be between 1 and 30 characters"))]
    pub phone_number: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

pub type UpdateStudentDto = CreateStudentDto;

/// Optional filters for listing students. Supplied filters are combined.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StudentFilter {
    /// Exact name match, case-insensitive
    pub name: Option<String>,
    pub age: Option<i32>,
    /// MALE or FEMALE
    pub gender: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PhoneQuery {
    pub phone_number: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentResponse {
    pub success: bool,
    pub data: Student,
    pub message: String,
}

impl StudentResponse {
    pub fn new(data: Student, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentListResponse {
    pub success: bool,
    pub data: Vec<Student>,
    pub message: String,
}

impl StudentListResponse {
    pub fn new(data: Vec<Student>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(gender: &str, password: &str) -> CreateStudentDto {
        serde_json::from_value(json!({
            "name": "Ada",
            "age": 21,
            "gender": gender,
            "email": "ada@example.com",
            "phoneNumber": "555-0100",
            "password": password
        }))
        .unwrap()
    }

    #[test]
    fn reads_camel_case_body() {
        let dto = body("FEMALE", "pw");
        assert_eq!(dto.phone_number, "555-0100");
        assert!(dto.bio.is_none());
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn rejects_unknown_gender() {
        let errors = body("robot", "pw").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("gender"));
    }

    #[test]
    fn rejects_empty_password() {
        let errors = body("MALE", "").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }
}
