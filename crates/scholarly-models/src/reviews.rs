use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    pub comment: String,
    pub rating: i32,
    pub added_at: DateTime<Utc>,
    pub course_id: i64,
    pub course_name: String,
    pub course_url: String,
    pub instructor_name: String,
    pub student_id: i64,
    pub student_name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewDto {
    #[validate(length(min = 1, max = 2000, message = "comment must be between 1 and 2000 characters"))]
    pub comment: String,
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i32,
    pub course_id: i64,
    pub student_id: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateReviewDto {
    #[validate(length(min = 1, max = 2000, message = "comment must be between 1 and 2000 characters"))]
    pub comment: String,
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i32,
}
