use anyhow::{Context, anyhow};
use sqlx::{PgConnection, PgPool};
use tracing::{debug, info, instrument};

use scholarly_core::AppError;
use scholarly_models::{CreateReviewDto, Review, UpdateReviewDto};

use crate::metrics::track_review;
use crate::modules::instructors::service::InstructorService;
use crate::utils::email::{EmailService, Notification};

const REVIEW_SELECT: &str = "SELECT r.id, r.comment, r.rating, r.added_at, \
     r.course_id, c.title AS course_name, c.course_url, i.name AS instructor_name, \
     r.student_id, s.name AS student_name \
     FROM reviews r \
     JOIN courses c ON c.id = r.course_id \
     JOIN instructors i ON i.id = c.instructor_id \
     JOIN students s ON s.id = r.student_id";

pub struct ReviewService;

impl ReviewService {
    #[instrument(skip(db))]
    pub async fn list_reviews(db: &PgPool) -> Result<Vec<Review>, AppError> {
        let sql = format!("{REVIEW_SELECT} ORDER BY r.id");

        sqlx::query_as::<_, Review>(&sql)
            .fetch_all(db)
            .await
            .context("Failed to fetch reviews")
            .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn get_review(db: &PgPool, id: i64) -> Result<Review, AppError> {
        let sql = format!("{REVIEW_SELECT} WHERE r.id = $1");

        sqlx::query_as::<_, Review>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch review")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Review with id {} not found", id)))
    }

    #[instrument(skip(db))]
    pub async fn list_for_course(db: &PgPool, course_id: i64) -> Result<Vec<Review>, AppError> {
        let sql = format!("{REVIEW_SELECT} WHERE r.course_id = $1 ORDER BY r.added_at");

        sqlx::query_as::<_, Review>(&sql)
            .bind(course_id)
            .fetch_all(db)
            .await
            .context("Failed to fetch course reviews")
            .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn list_for_student(db: &PgPool, student_id: i64) -> Result<Vec<Review>, AppError> {
        let sql = format!("{REVIEW_SELECT} WHERE r.student_id = $1 ORDER BY r.added_at");

        sqlx::query_as::<_, Review>(&sql)
            .bind(student_id)
            .fetch_all(db)
            .await
            .context("Failed to fetch student reviews")
            .map_err(AppError::database)
    }

    /// The student's reviews of the course with this title, matched ignoring
    /// case. 404 when there are none.
    #[instrument(skip(db))]
    pub async fn list_for_student_and_course_title(
        db: &PgPool,
        student_id: i64,
        course_title: &str,
    ) -> Result<Vec<Review>, AppError> {
        let sql = format!(
            "{REVIEW_SELECT} WHERE r.student_id = $1 AND LOWER(c.title) = LOWER($2) \
             ORDER BY r.added_at"
        );

        let reviews = sqlx::query_as::<_, Review>(&sql)
            .bind(student_id)
            .bind(course_title.trim())
            .fetch_all(db)
            .await
            .context("Failed to fetch student reviews")
            .map_err(AppError::database)?;

        if reviews.is_empty() {
            return Err(AppError::not_found(anyhow!(
                "No reviews found for student with id {} for course {}",
                student_id,
                course_title
            )));
        }

        Ok(reviews)
    }

    #[instrument(skip(db))]
    pub async fn list_for_instructor_and_category(
        db: &PgPool,
        instructor_name: &str,
        category_name: &str,
    ) -> Result<Vec<Review>, AppError> {
        let sql = format!(
            "{REVIEW_SELECT} \
             JOIN categories cat ON cat.id = c.category_id \
             WHERE LOWER(i.name) = LOWER($1) AND LOWER(cat.name) = LOWER($2) \
             ORDER BY r.added_at"
        );

        sqlx::query_as::<_, Review>(&sql)
            .bind(instructor_name.trim())
            .bind(category_name.trim())
            .fetch_all(db)
            .await
            .context("Failed to fetch reviews")
            .map_err(AppError::database)
    }

    /// Mean rating of the course's reviews, 0.0 when it has none.
    #[instrument(skip(db))]
    pub async fn course_average(db: &PgPool, course_id: i64) -> Result<f64, AppError> {
        sqlx::query_scalar(
            "SELECT COALESCE(AVG(rating), 0)::DOUBLE PRECISION FROM reviews WHERE course_id = $1",
        )
        .bind(course_id)
        .fetch_one(db)
        .await
        .context("Failed to compute course average")
        .map_err(AppError::database)
    }

    /// Mean rating across every review of the instructor's courses, 0.0 when
    /// there are none.
    #[instrument(skip(db))]
    pub async fn instructor_average(db: &PgPool, instructor_name: &str) -> Result<f64, AppError> {
        sqlx::query_scalar(
            "SELECT COALESCE(AVG(r.rating), 0)::DOUBLE PRECISION FROM reviews r \
             JOIN courses c ON c.id = r.course_id \
             JOIN instructors i ON i.id = c.instructor_id \
             WHERE LOWER(i.name) = LOWER($1)",
        )
        .bind(instructor_name.trim())
        .fetch_one(db)
        .await
        .context("Failed to compute instructor average")
        .map_err(AppError::database)
    }

    /// Stores the review and refreshes the course and instructor ratings in
    /// one transaction, then mails the instructor.
    #[instrument(skip(db, mailer, dto), fields(course_id = dto.course_id, student_id = dto.student_id))]
    pub async fn create_review(
        db: &PgPool,
        mailer: &EmailService,
        dto: &CreateReviewDto,
    ) -> Result<Review, AppError> {
        let mut tx = db
            .begin()
            .await
            .context("Failed to begin transaction")
            .map_err(AppError::database)?;

        let course: Option<(String, String, String)> = sqlx::query_as(
            "SELECT c.title, i.name, i.email FROM courses c \
             JOIN instructors i ON i.id = c.instructor_id \
             WHERE c.id = $1",
        )
        .bind(dto.course_id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to fetch course")
        .map_err(AppError::database)?;
        let (course_title, instructor_name, instructor_email) = course.ok_or_else(|| {
            AppError::not_found(anyhow!("Course with id {} not found", dto.course_id))
        })?;

        let student_name: String = sqlx::query_scalar("SELECT name FROM students WHERE id = $1")
            .bind(dto.student_id)
            .fetch_optional(&mut *tx)
            .await
            .context("Failed to fetch student")
            .map_err(AppError::database)?
            .ok_or_else(|| {
                AppError::not_found(anyhow!("Student with id {} not found", dto.student_id))
            })?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO reviews (comment, rating, course_id, student_id) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(dto.comment.trim())
        .bind(dto.rating)
        .bind(dto.course_id)
        .bind(dto.student_id)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to create review")
        .map_err(AppError::database)?;

        Self::refresh_ratings(&mut tx, dto.course_id).await?;

        tx.commit()
            .await
            .context("Failed to commit transaction")
            .map_err(AppError::database)?;

        let review = Self::get_review(db, id).await?;
        info!(review_id = id, "Review created");
        track_review("created");

        mailer.notify(Notification::NewReview {
            instructor_email,
            instructor_name,
            student_name,
            course_title,
            review: review.comment.clone(),
        });

        Ok(review)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_review(db: &PgPool, id: i64, dto: &UpdateReviewDto) -> Result<Review, AppError> {
        let mut tx = db
            .begin()
            .await
            .context("Failed to begin transaction")
            .map_err(AppError::database)?;

        let course_id: i64 = sqlx::query_scalar(
            "UPDATE reviews SET comment = $1, rating = $2 WHERE id = $3 RETURNING course_id",
        )
        .bind(dto.comment.trim())
        .bind(dto.rating)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to update review")
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow!("Review with id {} not found", id)))?;

        Self::refresh_ratings(&mut tx, course_id).await?;

        tx.commit()
            .await
            .context("Failed to commit transaction")
            .map_err(AppError::database)?;
        track_review("updated");

        Self::get_review(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn delete_review(db: &PgPool, id: i64) -> Result<(), AppError> {
        let mut tx = db
            .begin()
            .await
            .context("Failed to begin transaction")
            .map_err(AppError::database)?;

        let course_id: i64 = sqlx::query_scalar("DELETE FROM reviews WHERE id = $1 RETURNING course_id")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .context("Failed to delete review")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Review with id {} not found", id)))?;

        Self::refresh_ratings(&mut tx, course_id).await?;

        tx.commit()
            .await
            .context("Failed to commit transaction")
            .map_err(AppError::database)?;
        track_review("deleted");

        Ok(())
    }

    /// Recomputes the course's average rate, NULL once its last review is
    /// gone, and then its instructor's rating.
    async fn refresh_ratings(conn: &mut PgConnection, course_id: i64) -> Result<(), AppError> {
        let (instructor_id, average_rate): (i64, Option<f64>) = sqlx::query_as(
            "UPDATE courses \
             SET average_rate = (SELECT AVG(rating)::DOUBLE PRECISION FROM reviews WHERE course_id = $1) \
             WHERE id = $1 \
             RETURNING instructor_id, average_rate",
        )
        .bind(course_id)
        .fetch_one(&mut *conn)
        .await
        .context("Failed to update course rating")
        .map_err(AppError::database)?;

        let rating = InstructorService::recompute_rating(&mut *conn, instructor_id)
            .await
            .context("Failed to update instructor rating")
            .map_err(AppError::database)?;

        debug!(course_id, ?average_rate, instructor_id, ?rating, "Ratings refreshed");
        Ok(())
    }
}
