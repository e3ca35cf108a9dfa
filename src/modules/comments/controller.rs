use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use scholarly_core::{AppError, ErrorResponse};
use scholarly_models::{Comment, CreateCommentDto, MessageResponse, UpdateCommentDto};

use super::service::CommentService;
use crate::middleware::role::{RequireAdmin, RequireMember};
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/comments",
    request_body = CreateCommentDto,
    responses(
        (status = 201, description = "Comment posted", body = Comment),
        (status = 400, description = "Student already commented on this course", body = ErrorResponse),
        (status = 404, description = "Course, author or parent comment not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Comments"
)]
#[instrument(skip(state, caller, dto), fields(principal_id = caller.principal_id))]
pub async fn create_comment(
    State(state): State<AppState>,
    RequireMember(caller): RequireMember,
    ValidatedJson(dto): ValidatedJson<CreateCommentDto>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let comment = CommentService::create_comment(&state.db, &dto).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

#[utoipa::path(
    put,
    path = "/api/comments/{id}",
    params(("id" = i64, Path, description = "Comment ID")),
    request_body = UpdateCommentDto,
    responses(
        (status = 200, description = "Comment updated", body = Comment),
        (status = 404, description = "Comment not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Comments"
)]
#[instrument(skip(state, caller, dto), fields(principal_id = caller.principal_id))]
pub async fn update_comment(
    State(state): State<AppState>,
    RequireMember(caller): RequireMember,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateCommentDto>,
) -> Result<Json<Comment>, AppError> {
    Ok(Json(CommentService::update_comment(&state.db, id, &dto).await?))
}

#[utoipa::path(
    delete,
    path = "/api/comments/{id}",
    params(("id" = i64, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment deleted", body = MessageResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "Comment not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Comments"
)]
#[instrument(skip(state, caller), fields(admin_id = caller.principal_id))]
pub async fn delete_comment(
    State(state): State<AppState>,
    RequireAdmin(caller): RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    CommentService::delete_comment(&state.db, id).await?;
    Ok(Json(MessageResponse::ok("Comment deleted successfully")))
}

#[utoipa::path(
    get,
    path = "/api/comments/course/{id}",
    params(("id" = i64, Path, description = "Course ID")),
    responses((status = 200, description = "Comments on the course", body = Vec<Comment>)),
    security(("bearer_auth" = [])),
    tag = "Comments"
)]
#[instrument(skip(state, _caller))]
pub async fn list_comments_for_course(
    State(state): State<AppState>,
    RequireMember(_caller): RequireMember,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Comment>>, AppError> {
    Ok(Json(CommentService::list_for_course(&state.db, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/comments/student/{id}",
    params(("id" = i64, Path, description = "Student ID")),
    responses((status = 200, description = "Comments by the student", body = Vec<Comment>)),
    security(("bearer_auth" = [])),
    tag = "Comments"
)]
#[instrument(skip(state, _caller))]
pub async fn list_comments_for_student(
    State(state): State<AppState>,
    RequireMember(_caller): RequireMember,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Comment>>, AppError> {
    Ok(Json(CommentService::list_for_student(&state.db, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/comments/student/{id}/course/{course_id}",
    params(
        ("id" = i64, Path, description = "Student ID"),
        ("course_id" = i64, Path, description = "Course ID")
    ),
    responses((status = 200, description = "The student's comments on the course", body = Vec<Comment>)),
    security(("bearer_auth" = [])),
    tag = "Comments"
)]
#[instrument(skip(state, _caller))]
pub async fn list_comments_for_student_and_course(
    State(state): State<AppState>,
    RequireMember(_caller): RequireMember,
    Path((id, course_id)): Path<(i64, i64)>,
) -> Result<Json<Vec<Comment>>, AppError> {
    Ok(Json(
        CommentService::list_for_student_and_course(&state.db, id, course_id).await?,
    ))
}
