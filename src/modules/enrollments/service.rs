use anyhow::{Context, anyhow};
use sqlx::{FromRow, PgPool};
use tracing::{info, instrument};

use scholarly_core::AppError;
use scholarly_models::Enrollment;

use crate::metrics::track_enrollment;
use crate::utils::email::{EmailService, Notification};

const ENROLLMENT_SELECT: &str = "SELECT e.id, e.student_id, s.name AS student_name, \
     e.course_id, c.title AS course_title, e.enrollment_date \
     FROM enrollments e \
     JOIN students s ON s.id = e.student_id \
     JOIN courses c ON c.id = e.course_id";

/// What the instructor is told when an enrollment is cancelled.
#[derive(Debug, FromRow)]
struct Parties {
    student_name: String,
    course_title: String,
    instructor_name: String,
    instructor_email: String,
}

pub struct EnrollmentService;

impl EnrollmentService {
    /// Enrolls a student, then mails the student a welcome and the
    /// instructor a notice.
    #[instrument(skip(db, mailer))]
    pub async fn enroll(
        db: &PgPool,
        mailer: &EmailService,
        student_id: i64,
        course_id: i64,
    ) -> Result<Enrollment, AppError> {
        let student: Option<(String, String)> =
            sqlx::query_as("SELECT name, email FROM students WHERE id = $1")
                .bind(student_id)
                .fetch_optional(db)
                .await
                .context("Failed to fetch student")
                .map_err(AppError::database)?;
        let (student_name, student_email) = student.ok_or_else(|| {
            AppError::not_found(anyhow!("Student with id {} not found", student_id))
        })?;

        let course: Option<(String, String, String)> = sqlx::query_as(
            "SELECT c.title, i.name, i.email FROM courses c \
             JOIN instructors i ON i.id = c.instructor_id \
             WHERE c.id = $1",
        )
        .bind(course_id)
        .fetch_optional(db)
        .await
        .context("Failed to fetch course")
        .map_err(AppError::database)?;
        let (course_title, instructor_name, instructor_email) = course
            .ok_or_else(|| AppError::not_found(anyhow!("Course with id {} not found", course_id)))?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO enrollments (student_id, course_id) VALUES ($1, $2) \
             ON CONFLICT (student_id, course_id) DO NOTHING \
             RETURNING id",
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_optional(db)
        .await
        .context("Failed to create enrollment")
        .map_err(AppError::database)?
        .ok_or_else(|| {
            AppError::bad_request(anyhow!(
                "Student {} is already enrolled in course {}",
                student_id,
                course_id
            ))
        })?;

        let enrollment = Self::get_enrollment(db, id).await?;
        info!(enrollment_id = id, "Student enrolled");
        track_enrollment("enrolled");

        mailer.notify(Notification::EnrollmentWelcome {
            student_email,
            student_name: student_name.clone(),
            course_title: course_title.clone(),
            instructor_name: instructor_name.clone(),
        });
        mailer.notify(Notification::NewEnrollment {
            instructor_email,
            instructor_name,
            student_name,
            course_title,
        });

        Ok(enrollment)
    }

    /// Removes an enrollment and tells the instructor.
    #[instrument(skip(db, mailer))]
    pub async fn cancel(db: &PgPool, mailer: &EmailService, id: i64) -> Result<(), AppError> {
        let parties = sqlx::query_as::<_, Parties>(
            "DELETE FROM enrollments e \
             USING students s, courses c, instructors i \
             WHERE e.id = $1 AND s.id = e.student_id AND c.id = e.course_id \
               AND i.id = c.instructor_id \
             RETURNING s.name AS student_name, \
                       c.title AS course_title, i.name AS instructor_name, \
                       i.email AS instructor_email",
        )
        .bind(id)
        .fetch_optional(db)
        .await
        .context("Failed to delete enrollment")
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow!("Enrollment with id {} not found", id)))?;

        info!(enrollment_id = id, "Enrollment cancelled");
        track_enrollment("cancelled");

        mailer.notify(Notification::Unenrollment {
            instructor_email: parties.instructor_email,
            instructor_name: parties.instructor_name,
            student_name: parties.student_name,
            course_title: parties.course_title,
        });

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn get_enrollment(db: &PgPool, id: i64) -> Result<Enrollment, AppError> {
        let sql = format!("{ENROLLMENT_SELECT} WHERE e.id = $1");

        sqlx::query_as::<_, Enrollment>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch enrollment")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Enrollment with id {} not found", id)))
    }

    #[instrument(skip(db))]
    pub async fn list_for_student(db: &PgPool, student_id: i64) -> Result<Vec<Enrollment>, AppError> {
        let sql = format!("{ENROLLMENT_SELECT} WHERE e.student_id = $1 ORDER BY e.enrollment_date");

        sqlx::query_as::<_, Enrollment>(&sql)
            .bind(student_id)
            .fetch_all(db)
            .await
            .context("Failed to fetch student enrollments")
            .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn list_for_course(db: &PgPool, course_id: i64) -> Result<Vec<Enrollment>, AppError> {
        let sql = format!("{ENROLLMENT_SELECT} WHERE e.course_id = $1 ORDER BY e.enrollment_date");

        sqlx::query_as::<_, Enrollment>(&sql)
            .bind(course_id)
            .fetch_all(db)
            .await
            .context("Failed to fetch course enrollments")
            .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn find_for_student_and_course(
        db: &PgPool,
        student_id: i64,
        course_id: i64,
    ) -> Result<Enrollment, AppError> {
        let sql = format!("{ENROLLMENT_SELECT} WHERE e.student_id = $1 AND e.course_id = $2");

        sqlx::query_as::<_, Enrollment>(&sql)
            .bind(student_id)
            .bind(course_id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch enrollment")
            .map_err(AppError::database)?
            .ok_or_else(|| {
                AppError::not_found(anyhow!(
                    "Student {} is not enrolled in course {}",
                    student_id,
                    course_id
                ))
            })
    }
}
