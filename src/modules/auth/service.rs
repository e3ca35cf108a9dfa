use std::sync::LazyLock;

use sqlx::PgPool;
use tracing::{info, instrument, warn};

use scholarly_auth::TokenCodec;
use scholarly_core::{hash_password, verify_password};
use scholarly_models::{
    CreateInstructorDto, CreateStudentDto, Instructor, LoginRequest, Student, normalize_gender,
};

use super::error::AuthError;
use super::model::{Principal, PrincipalKind, PrincipalRow};
use crate::metrics::{track_login, track_registration, track_token_issued};
use crate::modules::instructors::service::INSTRUCTOR_COLUMNS;
use crate::modules::students::service::STUDENT_COLUMNS;

/// Digest checked when no principal matches, so unknown emails cost the same
/// bcrypt work as wrong passwords.
static TIMING_DIGEST: LazyLock<String> =
    LazyLock::new(|| hash_password("scholarly-timing-equalizer").unwrap_or_default());

/// A principal to leave out of uniqueness checks, used when it updates itself.
#[derive(Debug, Clone, Copy)]
pub struct Exclude {
    pub kind: PrincipalKind,
    pub id: i64,
}

pub struct AuthService;

impl AuthService {
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// Resolves a principal by email, probing students before instructors.
    #[instrument(skip(db))]
    pub async fn find_principal(db: &PgPool, email: &str) -> Result<Option<Principal>, AuthError> {
        let email = Self::normalize_email(email);

        for kind in PrincipalKind::LOOKUP_ORDER {
            let sql = format!(
                "SELECT id, email, password, role FROM {} WHERE email = $1",
                kind.table()
            );
            let row = sqlx::query_as::<_, PrincipalRow>(&sql)
                .bind(&email)
                .fetch_optional(db)
                .await?;

            if let Some(row) = row {
                return Principal::from_row(kind, row).map(Some);
            }
        }

        Ok(None)
    }

    /// Fails with [`AuthError::AlreadyExists`] when `email` or `phone_number`
    /// belongs to any principal other than `exclude`.
    #[instrument(skip(db))]
    pub async fn ensure_available(
        db: &PgPool,
        email: &str,
        phone_number: &str,
        exclude: Option<Exclude>,
    ) -> Result<(), AuthError> {
        let email = Self::normalize_email(email);
        let phone_number = phone_number.trim();

        if Self::is_taken(db, "email", &email, exclude).await? {
            return Err(AuthError::AlreadyExists(format!(
                "A user with email {} already exists",
                email
            )));
        }

        if Self::is_taken(db, "phone_number", phone_number, exclude).await? {
            return Err(AuthError::AlreadyExists(format!(
                "A user with phone number {} already exists",
                phone_number
            )));
        }

        Ok(())
    }

    async fn is_taken(
        db: &PgPool,
        column: &'static str,
        value: &str,
        exclude: Option<Exclude>,
    ) -> Result<bool, AuthError> {
        for kind in PrincipalKind::LOOKUP_ORDER {
            let excluded_id = exclude.filter(|e| e.kind == kind).map(|e| e.id);
            let sql = format!(
                "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = $1 AND id IS DISTINCT FROM $2)",
                kind.table(),
                column
            );
            let taken: bool = sqlx::query_scalar(&sql)
                .bind(value)
                .bind(excluded_id)
                .fetch_one(db)
                .await?;

            if taken {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Verifies credentials and issues a token carrying the principal's role.
    ///
    /// Unknown emails and wrong passwords both yield
    /// [`AuthError::InvalidCredentials`].
    #[instrument(skip(db, codec, dto), fields(email = %dto.email))]
    pub async fn login(
        db: &PgPool,
        codec: &TokenCodec,
        dto: &LoginRequest,
    ) -> Result<String, AuthError> {
        let principal = Self::find_principal(db, &dto.email).await?;

        let verified = match &principal {
            Some(principal) => verify_password(&dto.password, &principal.password_hash),
            None => {
                verify_password(&dto.password, &TIMING_DIGEST);
                false
            }
        };

        let Some(principal) = principal.filter(|_| verified) else {
            warn!("Login failed: invalid credentials");
            track_login("invalid_credentials");
            return Err(AuthError::InvalidCredentials);
        };

        let token = Self::issue_for(codec, &principal)?;
        track_login("success");
        info!(kind = ?principal.kind, "Login succeeded");

        Ok(token)
    }

    fn issue_for(codec: &TokenCodec, principal: &Principal) -> Result<String, AuthError> {
        let token = codec.issue_now(&principal.email, &[principal.role])?;
        track_token_issued();
        Ok(token)
    }

    /// Persists a new student with role USER.
    #[instrument(skip(db, dto), fields(email = %dto.email))]
    pub async fn create_student(db: &PgPool, dto: &CreateStudentDto) -> Result<Student, AuthError> {
        let kind = PrincipalKind::Student;
        Self::ensure_available(db, &dto.email, &dto.phone_number, None).await?;

        let gender = normalize_gender(&dto.gender)
            .ok_or_else(|| AuthError::Internal("gender was not validated".to_string()))?;
        let password_hash = hash_password(&dto.password)?;

        let sql = format!(
            "INSERT INTO students (name, age, gender, bio, email, phone_number, password, role) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {STUDENT_COLUMNS}"
        );
        let student = sqlx::query_as::<_, Student>(&sql)
            .bind(dto.name.trim())
            .bind(dto.age)
            .bind(gender)
            .bind(dto.bio.as_deref())
            .bind(Self::normalize_email(&dto.email))
            .bind(dto.phone_number.trim())
            .bind(password_hash)
            .bind(kind.role().as_str())
            .fetch_one(db)
            .await
            .map_err(map_unique_violation)?;

        track_registration("student");
        Ok(student)
    }

    /// Persists a new instructor with role ADMIN.
    #[instrument(skip(db, dto), fields(email = %dto.email))]
    pub async fn create_instructor(
        db: &PgPool,
        dto: &CreateInstructorDto,
    ) -> Result<Instructor, AuthError> {
        let kind = PrincipalKind::Instructor;
        Self::ensure_available(db, &dto.email, &dto.phone_number, None).await?;

        let gender = normalize_gender(&dto.gender)
            .ok_or_else(|| AuthError::Internal("gender was not validated".to_string()))?;
        let password_hash = hash_password(&dto.password)?;

        let sql = format!(
            "INSERT INTO instructors (name, age, gender, bio, email, phone_number, password, role) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {INSTRUCTOR_COLUMNS}"
        );
        let instructor = sqlx::query_as::<_, Instructor>(&sql)
            .bind(dto.name.trim())
            .bind(dto.age)
            .bind(gender)
            .bind(dto.bio.as_deref())
            .bind(Self::normalize_email(&dto.email))
            .bind(dto.phone_number.trim())
            .bind(password_hash)
            .bind(kind.role().as_str())
            .fetch_one(db)
            .await
            .map_err(map_unique_violation)?;

        track_registration("instructor");
        Ok(instructor)
    }

    /// Creates a student and signs it in.
    pub async fn register_student(
        db: &PgPool,
        codec: &TokenCodec,
        dto: &CreateStudentDto,
    ) -> Result<String, AuthError> {
        let student = Self::create_student(db, dto).await?;
        Self::issue_for(
            codec,
            &Principal {
                id: student.id,
                email: student.email,
                kind: PrincipalKind::Student,
                role: PrincipalKind::Student.role(),
                password_hash: String::new(),
            },
        )
    }

    /// Creates an instructor and signs it in.
    pub async fn register_instructor(
        db: &PgPool,
        codec: &TokenCodec,
        dto: &CreateInstructorDto,
    ) -> Result<String, AuthError> {
        let instructor = Self::create_instructor(db, dto).await?;
        Self::issue_for(
            codec,
            &Principal {
                id: instructor.id,
                email: instructor.email,
                kind: PrincipalKind::Instructor,
                role: PrincipalKind::Instructor.role(),
                password_hash: String::new(),
            },
        )
    }
}

/// Unique violations that slip past [`AuthService::ensure_available`] under
/// concurrent writes. `principal_contacts` raises them for clashes across the
/// student and instructor tables.
pub fn map_unique_violation(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return AuthError::AlreadyExists("Email or phone number already in use".to_string());
        }
    }
    AuthError::Database(err)
}
