use anyhow::{Context, anyhow};
use sqlx::PgPool;
use tracing::instrument;

use scholarly_core::{AppError, hash_password};
use scholarly_models::{CreateStudentDto, Student, StudentFilter, UpdateStudentDto, normalize_gender};

use crate::modules::auth::model::PrincipalKind;
use crate::modules::auth::service::{AuthService, Exclude, map_unique_violation};

pub const STUDENT_COLUMNS: &str =
    "id, name, age, gender, bio, email, phone_number, created_at, updated_at";

pub struct StudentService;

impl StudentService {
    #[instrument(skip(db, dto), fields(email = %dto.email))]
    pub async fn create_student(db: &PgPool, dto: &CreateStudentDto) -> Result<Student, AppError> {
        AuthService::create_student(db, dto)
            .await
            .map_err(|e| e.into_app_error())
    }

    #[instrument(skip(db))]
    pub async fn list_students(db: &PgPool, filter: &StudentFilter) -> Result<Vec<Student>, AppError> {
        let gender = match filter.gender.as_deref() {
            Some(raw) => Some(normalize_gender(raw).ok_or_else(|| {
                AppError::bad_request(anyhow!("gender must be MALE or FEMALE"))
            })?),
            None => None,
        };

        let sql = format!(
            "SELECT {STUDENT_COLUMNS} FROM students \
             WHERE ($1::TEXT IS NULL OR LOWER(name) = LOWER($1)) \
               AND ($2::INTEGER IS NULL OR age = $2) \
               AND ($3::TEXT IS NULL OR gender = $3) \
             ORDER BY id"
        );

        let students = sqlx::query_as::<_, Student>(&sql)
            .bind(filter.name.as_deref().map(str::trim))
            .bind(filter.age)
            .bind(gender)
            .fetch_all(db)
            .await
            .context("Failed to fetch students")
            .map_err(AppError::database)?;

        Ok(students)
    }

    #[instrument(skip(db))]
    pub async fn get_student(db: &PgPool, id: i64) -> Result<Student, AppError> {
        let sql = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1");

        sqlx::query_as::<_, Student>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch student by ID")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Student with id {} not found", id)))
    }

    #[instrument(skip(db))]
    pub async fn get_student_by_email(db: &PgPool, email: &str) -> Result<Student, AppError> {
        let sql = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE email = $1");

        sqlx::query_as::<_, Student>(&sql)
            .bind(AuthService::normalize_email(email))
            .fetch_optional(db)
            .await
            .context("Failed to fetch student by email")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Student with email {} not found", email)))
    }

    #[instrument(skip(db))]
    pub async fn get_student_by_phone(db: &PgPool, phone_number: &str) -> Result<Student, AppError> {
        let sql = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE phone_number = $1");

        sqlx::query_as::<_, Student>(&sql)
            .bind(phone_number.trim())
            .fetch_optional(db)
            .await
            .context("Failed to fetch student by phone number")
            .map_err(AppError::database)?
            .ok_or_else(|| {
                AppError::not_found(anyhow!("Student with phone number {} not found", phone_number))
            })
    }

    /// Full update. The password is re-hashed and email/phone uniqueness is
    /// checked against every other principal.
    #[instrument(skip(db, dto))]
    pub async fn update_student(
        db: &PgPool,
        id: i64,
        dto: &UpdateStudentDto,
    ) -> Result<Student, AppError> {
        Self::get_student(db, id).await?;

        AuthService::ensure_available(
            db,
            &dto.email,
            &dto.phone_number,
            Some(Exclude {
                kind: PrincipalKind::Student,
                id,
            }),
        )
        .await
        .map_err(|e| e.into_app_error())?;

        let gender = normalize_gender(&dto.gender)
            .ok_or_else(|| AppError::unprocessable(anyhow!("gender must be MALE or FEMALE")))?;
        let password_hash = hash_password(&dto.password)?;

        let sql = format!(
            "UPDATE students \
             SET name = $1, age = $2, gender = $3, bio = $4, email = $5, phone_number = $6, \
                 password = $7, updated_at = NOW() \
             WHERE id = $8 \
             RETURNING {STUDENT_COLUMNS}"
        );

        let student = sqlx::query_as::<_, Student>(&sql)
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
            .ok_or_else(|| AppError::not_found(anyhow!("Student with id {} not found", id)))?;

        Ok(student)
    }

    #[instrument(skip(db))]
    pub async fn delete_student(db: &PgPool, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("Failed to delete student")
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Student with id {} not found", id)));
        }

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn delete_student_by_phone(db: &PgPool, phone_number: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM students WHERE phone_number = $1")
            .bind(phone_number.trim())
            .execute(db)
            .await
            .context("Failed to delete student by phone number")
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!(
                "Student with phone number {} not found",
                phone_number
            )));
        }

        Ok(())
    }
}
