use anyhow::{Context, anyhow};
use sqlx::PgPool;
use tracing::{info, instrument};

use scholarly_core::AppError;
use scholarly_models::{Comment, CreateCommentDto, UpdateCommentDto};

use crate::metrics::track_comment;

const COMMENT_COLUMNS: &str =
    "id, content, is_discussion, parent_comment_id, course_id, student_id, instructor_id, created_at";

pub struct CommentService;

impl CommentService {
    /// Posts a comment or a reply. Each student gets a single top-level
    /// comment per course; replies are unlimited.
    #[instrument(skip(db, dto), fields(course_id = dto.course_id))]
    pub async fn create_comment(db: &PgPool, dto: &CreateCommentDto) -> Result<Comment, AppError> {
        Self::ensure_exists(db, "courses", dto.course_id, "Course").await?;
        if let Some(student_id) = dto.student_id {
            Self::ensure_exists(db, "students", student_id, "Student").await?;
        }
        if let Some(instructor_id) = dto.instructor_id {
            Self::ensure_exists(db, "instructors", instructor_id, "Instructor").await?;
        }

        match dto.parent_comment_id {
            Some(parent_id) => Self::ensure_parent(db, parent_id, dto.course_id).await?,
            None => {
                if let Some(student_id) = dto.student_id {
                    Self::ensure_first_comment(db, student_id, dto.course_id).await?;
                }
            }
        }

        let sql = format!(
            "INSERT INTO comments \
             (content, is_discussion, parent_comment_id, course_id, student_id, instructor_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COMMENT_COLUMNS}"
        );

        let comment = sqlx::query_as::<_, Comment>(&sql)
            .bind(dto.content.trim())
            .bind(dto.is_discussion)
            .bind(dto.parent_comment_id)
            .bind(dto.course_id)
            .bind(dto.student_id)
            .bind(dto.instructor_id)
            .fetch_one(db)
            .await
            .context("Failed to create comment")
            .map_err(AppError::database)?;

        info!(comment_id = comment.id, "Comment created");
        track_comment(if comment.parent_comment_id.is_some() { "reply" } else { "comment" });
        Ok(comment)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_comment(db: &PgPool, id: i64, dto: &UpdateCommentDto) -> Result<Comment, AppError> {
        let sql = format!(
            "UPDATE comments SET content = $1, is_discussion = $2 WHERE id = $3 \
             RETURNING {COMMENT_COLUMNS}"
        );

        sqlx::query_as::<_, Comment>(&sql)
            .bind(dto.content.trim())
            .bind(dto.is_discussion)
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to update comment")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Comment with id {} not found", id)))
    }

    /// Replies go with their parent.
    #[instrument(skip(db))]
    pub async fn delete_comment(db: &PgPool, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("Failed to delete comment")
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Comment with id {} not found", id)));
        }

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn list_for_course(db: &PgPool, course_id: i64) -> Result<Vec<Comment>, AppError> {
        let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE course_id = $1 ORDER BY created_at, id");

        sqlx::query_as::<_, Comment>(&sql)
            .bind(course_id)
            .fetch_all(db)
            .await
            .context("Failed to fetch course comments")
            .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn list_for_student(db: &PgPool, student_id: i64) -> Result<Vec<Comment>, AppError> {
        let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE student_id = $1 ORDER BY created_at, id");

        sqlx::query_as::<_, Comment>(&sql)
            .bind(student_id)
            .fetch_all(db)
            .await
            .context("Failed to fetch student comments")
            .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn list_for_student_and_course(
        db: &PgPool,
        student_id: i64,
        course_id: i64,
    ) -> Result<Vec<Comment>, AppError> {
        let sql = format!(
            "SELECT {COMMENT_COLUMNS} FROM comments \
             WHERE student_id = $1 AND course_id = $2 ORDER BY created_at, id"
        );

        sqlx::query_as::<_, Comment>(&sql)
            .bind(student_id)
            .bind(course_id)
            .fetch_all(db)
            .await
            .context("Failed to fetch comments")
            .map_err(AppError::database)
    }

    async fn ensure_exists(
        db: &PgPool,
        table: &'static str,
        id: i64,
        label: &'static str,
    ) -> Result<(), AppError> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)", table);
        let exists: bool = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_one(db)
            .await
            .with_context(|| format!("Failed to look up {}", table))
            .map_err(AppError::database)?;

        if !exists {
            return Err(AppError::not_found(anyhow!("{} with id {} not found", label, id)));
        }
        Ok(())
    }

    async fn ensure_parent(db: &PgPool, parent_id: i64, course_id: i64) -> Result<(), AppError> {
        let parent_course: i64 = sqlx::query_scalar("SELECT course_id FROM comments WHERE id = $1")
            .bind(parent_id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch parent comment")
            .map_err(AppError::database)?
            .ok_or_else(|| {
                AppError::not_found(anyhow!("Comment with id {} not found", parent_id))
            })?;

        if parent_course != course_id {
            return Err(AppError::bad_request(anyhow!(
                "Comment {} belongs to another course",
                parent_id
            )));
        }
        Ok(())
    }

    async fn ensure_first_comment(db: &PgPool, student_id: i64, course_id: i64) -> Result<(), AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM comments \
             WHERE student_id = $1 AND course_id = $2 AND parent_comment_id IS NULL)",
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_one(db)
        .await
        .context("Failed to check existing comment")
        .map_err(AppError::database)?;

        if exists {
            return Err(AppError::bad_request(anyhow!("Comment already exists")));
        }
        Ok(())
    }
}
