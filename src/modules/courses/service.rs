use anyhow::{Context, anyhow};
use sqlx::{PgExecutor, PgPool};
use tracing::{info, instrument};

use scholarly_core::AppError;
use scholarly_models::{Course, CreateCourseDto, UpdateCourseDto};

use crate::modules::categories::service::CategoryService;
use crate::modules::instructors::service::InstructorService;

/// Course columns joined with instructor and category names. Callers append
/// their own `WHERE` and `ORDER BY`.
pub const COURSE_SELECT: &str = "SELECT c.id, c.title, c.description, c.course_url, c.average_rate, \
     c.instructor_id, i.name AS instructor_name, \
     c.category_id, cat.name AS category_name, \
     c.created_at, c.updated_at \
     FROM courses c \
     JOIN instructors i ON i.id = c.instructor_id \
     LEFT JOIN categories cat ON cat.id = c.category_id";

/// Lower-cased with every space removed, for the whitespace-insensitive
/// lookups.
fn merged(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

pub struct CourseService;

impl CourseService {
    #[instrument(skip(db))]
    pub async fn list_courses(db: &PgPool) -> Result<Vec<Course>, AppError> {
        let sql = format!("{COURSE_SELECT} ORDER BY c.id");
        Self::fetch_all(db, &sql, &[]).await
    }

    #[instrument(skip(db))]
    pub async fn get_course(db: &PgPool, id: i64) -> Result<Course, AppError> {
        Self::find_course(db, id)
            .await
            .context("Failed to fetch course by ID")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Course with id {} not found", id)))
    }

    pub async fn find_course<'e, E>(executor: E, id: i64) -> Result<Option<Course>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!("{COURSE_SELECT} WHERE c.id = $1");
        sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Exact case-insensitive title first, then the same title with spaces
    /// ignored.
    #[instrument(skip(db))]
    pub async fn get_course_by_title(db: &PgPool, title: &str) -> Result<Course, AppError> {
        if let Some(course) = Self::find_by_exact_title(db, title).await? {
            return Ok(course);
        }

        Self::find_by_merged_title(db, title)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Course with title {} not found", title)))
    }

    async fn find_by_exact_title(db: &PgPool, title: &str) -> Result<Option<Course>, AppError> {
        let sql = format!("{COURSE_SELECT} WHERE LOWER(c.title) = LOWER($1) ORDER BY c.id LIMIT 1");

        sqlx::query_as::<_, Course>(&sql)
            .bind(title.trim())
            .fetch_optional(db)
            .await
            .context("Failed to fetch course by title")
            .map_err(AppError::database)
    }

    async fn find_by_merged_title(db: &PgPool, title: &str) -> Result<Option<Course>, AppError> {
        let sql = format!(
            "{COURSE_SELECT} WHERE REPLACE(LOWER(c.title), ' ', '') = $1 ORDER BY c.id LIMIT 1"
        );

        sqlx::query_as::<_, Course>(&sql)
            .bind(merged(title))
            .fetch_optional(db)
            .await
            .context("Failed to fetch course by title")
            .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn list_by_category(db: &PgPool, category_id: i64) -> Result<Vec<Course>, AppError> {
        let sql = format!("{COURSE_SELECT} WHERE c.category_id = $1 ORDER BY c.id");
        Self::fetch_all(db, &sql, &[Param::Id(category_id)]).await
    }

    #[instrument(skip(db))]
    pub async fn list_by_instructor(db: &PgPool, instructor_id: i64) -> Result<Vec<Course>, AppError> {
        let sql = format!("{COURSE_SELECT} WHERE c.instructor_id = $1 ORDER BY c.id");
        Self::fetch_all(db, &sql, &[Param::Id(instructor_id)]).await
    }

    #[instrument(skip(db))]
    pub async fn list_by_category_name(db: &PgPool, name: &str) -> Result<Vec<Course>, AppError> {
        let sql = format!("{COURSE_SELECT} WHERE LOWER(cat.name) = LOWER($1) ORDER BY c.id");
        Self::fetch_all(db, &sql, &[Param::Text(name.trim())]).await
    }

    /// A whitespace-insensitive title match wins outright. Otherwise every
    /// course of the instructors whose name matches the same way.
    #[instrument(skip(db))]
    pub async fn search(db: &PgPool, query: &str) -> Result<Vec<Course>, AppError> {
        if let Some(course) = Self::find_by_merged_title(db, query).await? {
            return Ok(vec![course]);
        }

        let sql = format!(
            "{COURSE_SELECT} WHERE REPLACE(LOWER(i.name), ' ', '') = $1 ORDER BY c.id"
        );
        let needle = merged(query);
        Self::fetch_all(db, &sql, &[Param::Text(&needle)]).await
    }

    #[instrument(skip(db))]
    pub async fn list_sorted_by_rate(db: &PgPool) -> Result<Vec<Course>, AppError> {
        let sql = format!("{COURSE_SELECT} ORDER BY c.average_rate DESC NULLS LAST, c.id");
        Self::fetch_all(db, &sql, &[]).await
    }

    #[instrument(skip(db))]
    pub async fn highest_rated_in_category(db: &PgPool, category_id: i64) -> Result<Course, AppError> {
        let sql = format!(
            "{COURSE_SELECT} WHERE c.category_id = $1 \
             ORDER BY c.average_rate DESC NULLS LAST, c.id LIMIT 1"
        );

        sqlx::query_as::<_, Course>(&sql)
            .bind(category_id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch highest rated course")
            .map_err(AppError::database)?
            .ok_or_else(|| {
                AppError::not_found(anyhow!("No courses found in category {}", category_id))
            })
    }

    #[instrument(skip(db))]
    pub async fn highest_rated_in_category_name(db: &PgPool, name: &str) -> Result<Course, AppError> {
        let sql = format!(
            "{COURSE_SELECT} WHERE LOWER(cat.name) = LOWER($1) \
             ORDER BY c.average_rate DESC NULLS LAST, c.id LIMIT 1"
        );

        sqlx::query_as::<_, Course>(&sql)
            .bind(name.trim())
            .fetch_optional(db)
            .await
            .context("Failed to fetch highest rated course")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("No courses found in category {}", name)))
    }

    /// The instructor's courses in the category, best rated first.
    #[instrument(skip(db))]
    pub async fn rated_by_category_and_instructor(
        db: &PgPool,
        category_name: &str,
        instructor_name: &str,
    ) -> Result<Vec<Course>, AppError> {
        let sql = format!(
            "{COURSE_SELECT} WHERE LOWER(cat.name) = LOWER($1) AND LOWER(i.name) = LOWER($2) \
             ORDER BY c.average_rate DESC NULLS LAST, c.id"
        );
        Self::fetch_all(
            db,
            &sql,
            &[
                Param::Text(category_name.trim()),
                Param::Text(instructor_name.trim()),
            ],
        )
        .await
    }

    /// The instructor must exist. The category is matched by name ignoring
    /// case and created when missing.
    #[instrument(skip(db, dto), fields(title = %dto.title))]
    pub async fn create_course(db: &PgPool, dto: &CreateCourseDto) -> Result<Course, AppError> {
        if !InstructorService::exists_by_id(db, dto.instructor_id).await? {
            return Err(AppError::not_found(anyhow!(
                "Instructor with id {} not found",
                dto.instructor_id
            )));
        }

        let mut tx = db
            .begin()
            .await
            .context("Failed to begin transaction")
            .map_err(AppError::database)?;

        let category = CategoryService::find_or_create(&mut tx, &dto.category_name)
            .await
            .context("Failed to resolve course category")
            .map_err(AppError::database)?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO courses (title, description, course_url, instructor_id, category_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id",
        )
        .bind(dto.title.trim())
        .bind(&dto.description)
        .bind(dto.course_url.trim())
        .bind(dto.instructor_id)
        .bind(category.id)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to create course")
        .map_err(AppError::database)?;

        let course = Self::find_course(&mut *tx, id)
            .await
            .context("Failed to fetch created course")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::internal(anyhow!("Created course {} vanished", id)))?;

        tx.commit()
            .await
            .context("Failed to commit transaction")
            .map_err(AppError::database)?;

        info!(course_id = course.id, category_id = category.id, "Course created");
        Ok(course)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_course(db: &PgPool, id: i64, dto: &UpdateCourseDto) -> Result<Course, AppError> {
        let result = sqlx::query(
            "UPDATE courses SET title = $1, description = $2, course_url = $3, updated_at = NOW() \
             WHERE id = $4",
        )
        .bind(dto.title.trim())
        .bind(&dto.description)
        .bind(dto.course_url.trim())
        .bind(id)
        .execute(db)
        .await
        .context("Failed to update course")
        .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Course with id {} not found", id)));
        }

        Self::get_course(db, id).await
    }

    /// Removes the course with its enrollments, reviews and comments, then
    /// refreshes the instructor's rating.
    #[instrument(skip(db))]
    pub async fn delete_course(db: &PgPool, id: i64) -> Result<(), AppError> {
        let mut tx = db
            .begin()
            .await
            .context("Failed to begin transaction")
            .map_err(AppError::database)?;

        let instructor_id: i64 =
            sqlx::query_scalar("DELETE FROM courses WHERE id = $1 RETURNING instructor_id")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .context("Failed to delete course")
                .map_err(AppError::database)?
                .ok_or_else(|| AppError::not_found(anyhow!("Course with id {} not found", id)))?;

        InstructorService::recompute_rating(&mut *tx, instructor_id)
            .await
            .context("Failed to update instructor rating")
            .map_err(AppError::database)?;

        tx.commit()
            .await
            .context("Failed to commit transaction")
            .map_err(AppError::database)?;

        Ok(())
    }

    async fn fetch_all(db: &PgPool, sql: &str, params: &[Param<'_>]) -> Result<Vec<Course>, AppError> {
        let mut query = sqlx::query_as::<_, Course>(sql);
        for param in params {
            query = match *param {
                Param::Id(id) => query.bind(id),
                Param::Text(text) => query.bind(text.to_owned()),
            };
        }

        query
            .fetch_all(db)
            .await
            .context("Failed to fetch courses")
            .map_err(AppError::database)
    }
}

#[derive(Debug, Clone, Copy)]
enum Param<'a> {
    Id(i64),
    Text(&'a str),
}
