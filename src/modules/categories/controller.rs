use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use scholarly_core::{AppError, ErrorResponse};
use scholarly_models::{Category, CreateCategoryDto, MessageResponse};

use super::service::CategoryService;
use crate::middleware::role::{RequireAdmin, RequireMember};
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "All categories", body = Vec<Category>),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
#[instrument(skip(state, _caller))]
pub async fn list_categories(
    State(state): State<AppState>,
    RequireMember(_caller): RequireMember,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(CategoryService::list_categories(&state.db).await?))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(("id" = i64, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category found", body = Category),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
#[instrument(skip(state, _caller))]
pub async fn get_category(
    State(state): State<AppState>,
    RequireMember(_caller): RequireMember,
    Path(id): Path<i64>,
) -> Result<Json<Category>, AppError> {
    Ok(Json(CategoryService::get_category(&state.db, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryDto,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Category already exists", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
#[instrument(skip(state, caller, dto), fields(admin_id = caller.principal_id))]
pub async fn create_category(
    State(state): State<AppState>,
    RequireAdmin(caller): RequireAdmin,
    ValidatedJson(dto): ValidatedJson<CreateCategoryDto>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = CategoryService::create_category(&state.db, &dto).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = i64, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted", body = MessageResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
#[instrument(skip(state, caller), fields(admin_id = caller.principal_id))]
pub async fn delete_category(
    State(state): State<AppState>,
    RequireAdmin(caller): RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    CategoryService::delete_category(&state.db, id).await?;
    Ok(Json(MessageResponse::ok("Category deleted successfully")))
}
