use anyhow::{Context, anyhow};
use sqlx::{PgConnection, PgPool};
use tracing::{info, instrument};

use scholarly_core::AppError;
use scholarly_models::{Category, CreateCategoryDto};

pub struct CategoryService;

impl CategoryService {
    #[instrument(skip(db))]
    pub async fn list_categories(db: &PgPool) -> Result<Vec<Category>, AppError> {
        sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name")
            .fetch_all(db)
            .await
            .context("Failed to fetch categories")
            .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn get_category(db: &PgPool, id: i64) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch category by ID")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Category with id {} not found", id)))
    }

    /// Names are unique regardless of letter case.
    #[instrument(skip(db, dto), fields(name = %dto.name))]
    pub async fn create_category(db: &PgPool, dto: &CreateCategoryDto) -> Result<Category, AppError> {
        let name = dto.name.trim();

        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES ($1) \
             ON CONFLICT DO NOTHING \
             RETURNING id, name",
        )
        .bind(name)
        .fetch_optional(db)
        .await
        .context("Failed to create category")
        .map_err(AppError::database)?
        .ok_or_else(|| {
            AppError::bad_request(anyhow!("Category with name {} already exists", name))
        })?;

        info!(category_id = category.id, "Category created");
        Ok(category)
    }

    #[instrument(skip(db))]
    pub async fn delete_category(db: &PgPool, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("Failed to delete category")
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!(
                "Category with id {} not found",
                id
            )));
        }

        Ok(())
    }

    /// Returns the category matching `name` case-insensitively, creating it
    /// when missing. Safe against a concurrent insert of the same name.
    pub async fn find_or_create(conn: &mut PgConnection, name: &str) -> Result<Category, sqlx::Error> {
        let name = name.trim();
        let select = "SELECT id, name FROM categories WHERE LOWER(name) = LOWER($1)";

        if let Some(category) = sqlx::query_as::<_, Category>(select)
            .bind(name)
            .fetch_optional(&mut *conn)
            .await?
        {
            return Ok(category);
        }

        sqlx::query("INSERT INTO categories (name) VALUES ($1) ON CONFLICT DO NOTHING")
            .bind(name)
            .execute(&mut *conn)
            .await?;

        sqlx::query_as::<_, Category>(select)
            .bind(name)
            .fetch_one(&mut *conn)
            .await
    }
}
