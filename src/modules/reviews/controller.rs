use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use scholarly_core::{AppError, ErrorResponse};
use scholarly_models::{CreateReviewDto, MessageResponse, Review, UpdateReviewDto};

use super::service::ReviewService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/reviews",
    responses((status = 200, description = "All reviews", body = Vec<Review>)),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
#[instrument(skip(state))]
pub async fn list_reviews(State(state): State<AppState>) -> Result<Json<Vec<Review>>, AppError> {
    Ok(Json(ReviewService::list_reviews(&state.db).await?))
}

#[utoipa::path(
    get,
    path = "/api/reviews/course/{id}",
    params(("id" = i64, Path, description = "Course ID")),
    responses((status = 200, description = "Reviews of the course", body = Vec<Review>)),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
#[instrument(skip(state))]
pub async fn list_reviews_for_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Review>>, AppError> {
    Ok(Json(ReviewService::list_for_course(&state.db, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/reviews/student/{id}",
    params(("id" = i64, Path, description = "Student ID")),
    responses((status = 200, description = "Reviews written by the student", body = Vec<Review>)),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
#[instrument(skip(state))]
pub async fn list_reviews_for_student(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Review>>, AppError> {
    Ok(Json(ReviewService::list_for_student(&state.db, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/reviews/student/{id}/course/{course_title}",
    params(
        ("id" = i64, Path, description = "Student ID"),
        ("course_title" = String, Path, description = "Course title, any case")
    ),
    responses(
        (status = 200, description = "The student's reviews of the course", body = Vec<Review>),
        (status = 404, description = "No reviews found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
#[instrument(skip(state))]
pub async fn list_reviews_for_student_and_course(
    State(state): State<AppState>,
    Path((id, course_title)): Path<(i64, String)>,
) -> Result<Json<Vec<Review>>, AppError> {
    Ok(Json(
        ReviewService::list_for_student_and_course_title(&state.db, id, &course_title).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/reviews/instructor/{instructor}/category/{category}",
    params(
        ("instructor" = String, Path, description = "Instructor name, any case"),
        ("category" = String, Path, description = "Category name, any case")
    ),
    responses((status = 200, description = "Reviews of the instructor's courses in the category", body = Vec<Review>)),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
#[instrument(skip(state))]
pub async fn list_reviews_for_instructor_and_category(
    State(state): State<AppState>,
    Path((instructor, category)): Path<(String, String)>,
) -> Result<Json<Vec<Review>>, AppError> {
    Ok(Json(
        ReviewService::list_for_instructor_and_category(&state.db, &instructor, &category)
            .await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/reviews/course/{id}/average",
    params(("id" = i64, Path, description = "Course ID")),
    responses((status = 200, description = "Mean rating, 0.0 without reviews", body = f64)),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
#[instrument(skip(state))]
pub async fn course_average(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<f64>, AppError> {
    Ok(Json(ReviewService::course_average(&state.db, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/reviews/instructor/{instructor}/average",
    params(("instructor" = String, Path, description = "Instructor name, any case")),
    responses((status = 200, description = "Mean rating, 0.0 without reviews", body = f64)),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
#[instrument(skip(state))]
pub async fn instructor_average(
    State(state): State<AppState>,
    Path(instructor): Path<String>,
) -> Result<Json<f64>, AppError> {
    Ok(Json(
        ReviewService::instructor_average(&state.db, &instructor).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/reviews",
    request_body = CreateReviewDto,
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 404, description = "Course or student not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
#[instrument(skip(state, dto))]
pub async fn create_review(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateReviewDto>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    let review = ReviewService::create_review(&state.db, &state.mailer, &dto).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

#[utoipa::path(
    put,
    path = "/api/reviews/{id}",
    params(("id" = i64, Path, description = "Review ID")),
    request_body = UpdateReviewDto,
    responses(
        (status = 200, description = "Review updated", body = Review),
        (status = 404, description = "Review not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
#[instrument(skip(state, dto))]
pub async fn update_review(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateReviewDto>,
) -> Result<Json<Review>, AppError> {
    Ok(Json(ReviewService::update_review(&state.db, id, &dto).await?))
}

#[utoipa::path(
    delete,
    path = "/api/reviews/{id}",
    params(("id" = i64, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review deleted", body = MessageResponse),
        (status = 404, description = "Review not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
#[instrument(skip(state))]
pub async fn delete_review(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    ReviewService::delete_review(&state.db, id).await?;
    Ok(Json(MessageResponse::ok("Review deleted successfully")))
}
