use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use scholarly_core::{AppError, ErrorResponse};
use scholarly_models::{CreateInstructorDto, Instructor, MessageResponse, UpdateInstructorDto};

use super::service::InstructorService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/instructors",
    responses(
        (status = 200, description = "All instructors", body = Vec<Instructor>),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Instructors"
)]
#[instrument(skip(state))]
pub async fn list_instructors(
    State(state): State<AppState>,
) -> Result<Json<Vec<Instructor>>, AppError> {
    Ok(Json(InstructorService::list_instructors(&state.db).await?))
}

#[utoipa::path(
    get,
    path = "/api/instructors/{id}",
    params(("id" = i64, Path, description = "Instructor ID")),
    responses(
        (status = 200, description = "Instructor found", body = Instructor),
        (status = 404, description = "Instructor not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Instructors"
)]
#[instrument(skip(state))]
pub async fn get_instructor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Instructor>, AppError> {
    Ok(Json(InstructorService::get_instructor(&state.db, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/instructors/email/{email}",
    params(("email" = String, Path, description = "Instructor email")),
    responses(
        (status = 200, description = "Instructor found", body = Instructor),
        (status = 404, description = "Instructor not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Instructors"
)]
#[instrument(skip(state))]
pub async fn get_instructor_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Instructor>, AppError> {
    Ok(Json(
        InstructorService::get_instructor_by_email(&state.db, &email).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/instructors",
    request_body = CreateInstructorDto,
    responses(
        (status = 201, description = "Instructor created", body = Instructor),
        (status = 400, description = "Email or phone number already in use", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Instructors"
)]
#[instrument(skip(state, dto))]
pub async fn create_instructor(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateInstructorDto>,
) -> Result<(StatusCode, Json<Instructor>), AppError> {
    let instructor = InstructorService::create_instructor(&state.db, &dto).await?;
    Ok((StatusCode::CREATED, Json(instructor)))
}

#[utoipa::path(
    put,
    path = "/api/instructors/{id}",
    params(("id" = i64, Path, description = "Instructor ID")),
    request_body = CreateInstructorDto,
    responses(
        (status = 200, description = "Instructor updated", body = Instructor),
        (status = 400, description = "Email or phone number already in use", body = ErrorResponse),
        (status = 404, description = "Instructor not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Instructors"
)]
#[instrument(skip(state, dto))]
pub async fn update_instructor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateInstructorDto>,
) -> Result<Json<Instructor>, AppError> {
    Ok(Json(
        InstructorService::update_instructor(&state.db, id, &dto).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/instructors/{id}",
    params(("id" = i64, Path, description = "Instructor ID")),
    responses(
        (status = 200, description = "Instructor deleted", body = MessageResponse),
        (status = 404, description = "Instructor not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Instructors"
)]
#[instrument(skip(state))]
pub async fn delete_instructor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    InstructorService::delete_instructor(&state.db, id).await?;
    Ok(Json(MessageResponse::ok("Instructor deleted successfully")))
}

#[utoipa::path(
    delete,
    path = "/api/instructors/email/{email}",
    params(("email" = String, Path, description = "Instructor email")),
    responses(
        (status = 200, description = "Instructor deleted", body = MessageResponse),
        (status = 404, description = "Instructor not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Instructors"
)]
#[instrument(skip(state))]
pub async fn delete_instructor_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    InstructorService::delete_instructor_by_email(&state.db, &email).await?;
    Ok(Json(MessageResponse::ok("Instructor deleted successfully")))
}

#[utoipa::path(
    get,
    path = "/api/instructors/exists/email/{email}",
    params(("email" = String, Path, description = "Email to look up")),
    responses((status = 200, description = "Whether an instructor uses this email", body = bool)),
    security(("bearer_auth" = [])),
    tag = "Instructors"
)]
#[instrument(skip(state))]
pub async fn exists_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<bool>, AppError> {
    Ok(Json(InstructorService::exists_by_email(&state.db, &email).await?))
}

#[utoipa::path(
    get,
    path = "/api/instructors/exists/phone/{phone}",
    params(("phone" = String, Path, description = "Phone number to look up")),
    responses((status = 200, description = "Whether an instructor uses this phone number", body = bool)),
    security(("bearer_auth" = [])),
    tag = "Instructors"
)]
#[instrument(skip(state))]
pub async fn exists_by_phone(
    State(state): State<AppState>,
    Path(phone): Path<String>,
) -> Result<Json<bool>, AppError> {
    Ok(Json(InstructorService::exists_by_phone(&state.db, &phone).await?))
}

#[utoipa::path(
    get,
    path = "/api/instructors/exists/id/{id}",
    params(("id" = i64, Path, description = "Instructor ID")),
    responses((status = 200, description = "Whether the instructor exists", body = bool)),
    security(("bearer_auth" = [])),
    tag = "Instructors"
)]
#[instrument(skip(state))]
pub async fn exists_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<bool>, AppError> {
    Ok(Json(InstructorService::exists_by_id(&state.db, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/instructors/rating/{id}",
    params(("id" = i64, Path, description = "Instructor ID")),
    responses(
        (status = 200, description = "Mean of the instructor's course ratings", body = f64),
        (status = 404, description = "Instructor not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Instructors"
)]
#[instrument(skip(state))]
pub async fn instructor_rating(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<f64>, AppError> {
    Ok(Json(InstructorService::refresh_rating(&state.db, id).await?))
}
