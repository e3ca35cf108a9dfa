use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::instrument;

use scholarly_core::ErrorResponse;
use scholarly_models::{AuthResponse, CreateInstructorDto, CreateStudentDto, LoginRequest};

use super::error::AuthError;
use super::service::AuthService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Login and receive a bearer token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Bad request - malformed body", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    let token = AuthService::login(&state.db, &state.tokens, &dto).await?;
    Ok(Json(AuthResponse::new(token, "Login successful")))
}

/// Register a student account (role USER) and sign it in
#[utoipa::path(
    post,
    path = "/api/auth/register/student",
    request_body = CreateStudentDto,
    responses(
        (status = 201, description = "Student registered and logged in", body = AuthResponse),
        (status = 400, description = "Email or phone number already in use", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn register_student(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateStudentDto>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthError> {
    let token = AuthService::register_student(&state.db, &state.tokens, &dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::new(
            token,
            "Student registered and logged in successfully.",
        )),
    ))
}

/// Register an instructor account (role ADMIN) and sign it in
#[utoipa::path(
    post,
    path = "/api/auth/register/instructor",
    request_body = CreateInstructorDto,
    responses(
        (status = 201, description = "Instructor registered and logged in", body = AuthResponse),
        (status = 400, description = "Email or phone number already in use", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn register_instructor(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateInstructorDto>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthError> {
    let token = AuthService::register_instructor(&state.db, &state.tokens, &dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::new(
            token,
            "Instructor registered and logged in successfully.",
        )),
    ))
}
