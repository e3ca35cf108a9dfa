use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub is_discussion: bool,
    pub parent_comment_id: Option<i64>,
    pub course_id: i64,
    pub student_id: Option<i64>,
    pub instructor_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// A comment is authored by a student, an instructor, or both when an
/// instructor answers on a student's behalf.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_author"))]
pub struct CreateCommentDto {
    #[validate(length(min = 1, max = 5000, message = "content must be between 1 and 5000 characters"))]
    pub content: String,
    #[serde(default)]
    pub is_discussion: bool,
    pub parent_comment_id: Option<i64>,
    pub course_id: i64,
    pub student_id: Option<i64>,
    pub instructor_id: Option<i64>,
}

fn validate_author(dto: &CreateCommentDto) -> Result<(), ValidationError> {
    if dto.student_id.is_none() && dto.instructor_id.is_none() {
        return Err(ValidationError::new("author")
            .with_message("studentId or instructorId is required".into()));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommentDto {
    #[validate(length(min = 1, max = 5000, message = "content must be between 1 and 5000 characters"))]
    pub content: String,
    #[serde(default)]
    pub is_discussion: bool,
}
