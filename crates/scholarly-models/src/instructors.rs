use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    pub id: i64,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub bio: Option<String>,
    pub email: String,
    pub phone_number: String,
    /// Mean review rating across the instructor's courses
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstructorDto {
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

pub type UpdateInstructorDto = CreateInstructorDto;
