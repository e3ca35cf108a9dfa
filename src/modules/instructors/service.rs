use anyhow::{Context, anyhow};
use sqlx::{PgExecutor, PgPool};
use tracing::{debug, instrument};

use scholarly_core::{AppError, hash_password};
use scholarly_models::{CreateInstructorDto, Instructor, UpdateInstructorDto, normalize_gender};

use crate::modules::auth::model::PrincipalKind;
use crate::modules::auth::service::{AuthService, Exclude, map_unique_violation};

pub const INSTRUCTOR_COLUMNS: &str =
    "id, name, age, gender, bio, email, phone_number, rating, created_at, updated_at";

pub struct InstructorService;

impl InstructorService {
    #[instrument(skip(db, dto), fields(email = %dto.email))]
    pub async fn create_instructor(
        db: &PgPool,
        dto: &CreateInstructorDto,
    ) -> Result<Instructor, AppError> {
        AuthService::create_instructor(db, dto)
            .await
            .map_err(|e| e.into_app_error())
    }

    #[instrument(skip(db))]
    pub async fn list_instructors(db: &PgPool) -> Result<Vec<Instructor>, AppError> {
        let sql = format!("SELECT {INSTRUCTOR_COLUMNS} FROM instructors ORDER BY id");

        sqlx::query_as::<_, Instructor>(&sql)
            .fetch_all(db)
            .await
            .context("Failed to fetch instructors")
            .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn get_instructor(db: &PgPool, id: i64) -> Result<Instructor, AppError> {
        let sql = format!("SELECT {INSTRUCTOR_COLUMNS} FROM instructors WHERE id = $1");

        sqlx::query_as::<_, Instructor>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch instructor by ID")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Instructor with id {} not found", id)))
    }

    #[instrument(skip(db))]
    pub async fn get_instructor_by_email(db: &PgPool, email: &str) -> Result<Instructor, AppError> {
        let sql = format!("SELECT {INSTRUCTOR_COLUMNS} FROM instructors WHERE email = $1");

        sqlx::query_as::<_, Instructor>(&sql)
            .bind(AuthService::normalize_email(email))
            .fetch_optional(db)
            .await
            .context("Failed to fetch instructor by email")
            .map_err(AppError::database)?
            .ok_or_else(|| {
                AppError::not_found(anyhow!("Instructor with email {} not found", email))
            })
    }

    /// Full update, with the same uniqueness and hashing rules as students.
    #[instrument(skip(db, dto))]
    pub async fn update_instructor(
        db: &PgPool,
        id: i64,
        dto: &UpdateInstructorDto,
    ) -> Result<Instructor, AppError> {
        Self::get_instructor(db, id).await?;

        AuthService::ensure_available(
            db,
            &dto.email,
            &dto.phone_number,
            Some(Exclude {
                kind: PrincipalKind::Instructor,
                id,
            }),
        )
        .await
        .map_err(|e| e.into_app_error())?;

        let gender = normalize_gender(&dto.gender)
            .ok_or_else(|| AppError::unprocessable(anyhow!("gender must be MALE or FEMALE")))?;
        let password_hash = hash_password(&dto.password)?;

        let sql = format!(
            "UPDATE instructors \
             SET name = $1, age = $2, gender = $3, bio = $4, email = $5, phone_number = $6, \
                 password = $7, updated_at = NOW() \
             WHERE id = $8 \
             RETURNING {INSTRUCTOR_COLUMNS}"
        );

        sqlx::query_as::<_, Instructor>(&sql)
            .bind(dto.name.trim())
            .bind(dto.age)
            .bind(gender)
            .bind(dto.bio.as_deref())
            .bind(AuthService::normalize_email(&dto.email))
            .bind(dto.phone_number.trim())
            .bind(password_hash)
            .bind(id)
            .fetch_optional(db)
            .await
            .map_err(|e| map_unique_violation(e).into_app_error())?
            .ok_or_else(|| AppError::not_found(anyhow!("Instructor with id {} not found", id)))
    }

    #[instrument(skip(db))]
    pub async fn delete_instructor(db: &PgPool, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM instructors WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("Failed to delete instructor")
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!(
                "Instructor with id {} not found",
                id
            )));
        }

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn delete_instructor_by_email(db: &PgPool, email: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM instructors WHERE email = $1")
            .bind(AuthService::normalize_email(email))
            .execute(db)
            .await
            .context("Failed to delete instructor by email")
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!(
                "Instructor with email {} not found",
                email
            )));
        }

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn exists_by_email(db: &PgPool, email: &str) -> Result<bool, AppError> {
        Self::exists(db, "email", &AuthService::normalize_email(email)).await
    }

    #[instrument(skip(db))]
    pub async fn exists_by_phone(db: &PgPool, phone_number: &str) -> Result<bool, AppError> {
        Self::exists(db, "phone_number", phone_number.trim()).await
    }

    #[instrument(skip(db))]
    pub async fn exists_by_id(db: &PgPool, id: i64) -> Result<bool, AppError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM instructors WHERE id = $1)")
            .bind(id)
            .fetch_one(db)
            .await
            .context("Failed to check instructor existence")
            .map_err(AppError::database)
    }

    async fn exists(db: &PgPool, column: &'static str, value: &str) -> Result<bool, AppError> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM instructors WHERE {} = $1)", column);

        sqlx::query_scalar(&sql)
            .bind(value)
            .fetch_one(db)
            .await
            .context("Failed to check instructor existence")
            .map_err(AppError::database)
    }

    /// Recomputes and stores the instructor's rating.
    #[instrument(skip(db))]
    pub async fn refresh_rating(db: &PgPool, id: i64) -> Result<f64, AppError> {
        let rating = Self::recompute_rating(db, id)
            .await
            .context("Failed to update instructor rating")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Instructor with id {} not found", id)))?;

        debug!(instructor_id = id, rating, "Instructor rating refreshed");
        Ok(rating)
    }

    /// Sets `rating` to the mean of the instructor's rated course averages,
    /// 0.0 when none are rated. `None` when the instructor does not exist.
    pub async fn recompute_rating<'e, E>(executor: E, id: i64) -> Result<Option<f64>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar(
            "UPDATE instructors \
             SET rating = COALESCE( \
                 (SELECT AVG(average_rate) FROM courses \
                  WHERE instructor_id = $1 AND average_rate IS NOT NULL), 0) \
             WHERE id = $1 \
             RETURNING rating",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }
}
