use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use scholarly_core::{AppError, ErrorResponse};
use scholarly_models::{
    Course, CreateCourseDto, MessageResponse, SearchQuery, TitleQuery, UpdateCourseDto,
};

use super::service::CourseService;
use crate::middleware::role::{RequireAdmin, RequireMember};
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/courses",
    responses(
        (status = 200, description = "All courses", body = Vec<Course>),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, _caller))]
pub async fn list_courses(
    State(state): State<AppState>,
    RequireMember(_caller): RequireMember,
) -> Result<Json<Vec<Course>>, AppError> {
    Ok(Json(CourseService::list_courses(&state.db).await?))
}

#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    params(("id" = i64, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course found", body = Course),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, _caller))]
pub async fn get_course(
    State(state): State<AppState>,
    RequireMember(_caller): RequireMember,
    Path(id): Path<i64>,
) -> Result<Json<Course>, AppError> {
    Ok(Json(CourseService::get_course(&state.db, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/courses/title",
    params(TitleQuery),
    responses(
        (status = 200, description = "Course found", body = Course),
        (status = 404, description = "No course with this title", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, _caller))]
pub async fn get_course_by_title(
    State(state): State<AppState>,
    RequireMember(_caller): RequireMember,
    Query(query): Query<TitleQuery>,
) -> Result<Json<Course>, AppError> {
    Ok(Json(
        CourseService::get_course_by_title(&state.db, &query.title).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/courses/category/{category_id}",
    params(("category_id" = i64, Path, description = "Category ID")),
    responses((status = 200, description = "Courses in the category", body = Vec<Course>)),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, _caller))]
pub async fn list_by_category(
    State(state): State<AppState>,
    RequireMember(_caller): RequireMember,
    Path(category_id): Path<i64>,
) -> Result<Json<Vec<Course>>, AppError> {
    Ok(Json(
        CourseService::list_by_category(&state.db, category_id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/courses/instructor/{instructor_id}",
    params(("instructor_id" = i64, Path, description = "Instructor ID")),
    responses((status = 200, description = "Courses taught by the instructor", body = Vec<Course>)),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, _caller))]
pub async fn list_by_instructor(
    State(state): State<AppState>,
    RequireMember(_caller): RequireMember,
    Path(instructor_id): Path<i64>,
) -> Result<Json<Vec<Course>>, AppError> {
    Ok(Json(
        CourseService::list_by_instructor(&state.db, instructor_id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/courses/search",
    params(SearchQuery),
    responses((status = 200, description = "Courses matching the title or instructor name", body = Vec<Course>)),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, _caller))]
pub async fn search_courses(
    State(state): State<AppState>,
    RequireMember(_caller): RequireMember,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Course>>, AppError> {
    Ok(Json(CourseService::search(&state.db, &query.query).await?))
}

#[utoipa::path(
    get,
    path = "/api/courses/category-name/{name}",
    params(("name" = String, Path, description = "Category name, any case")),
    responses((status = 200, description = "Courses in the category", body = Vec<Course>)),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, _caller))]
pub async fn list_by_category_name(
    State(state): State<AppState>,
    RequireMember(_caller): RequireMember,
    Path(name): Path<String>,
) -> Result<Json<Vec<Course>>, AppError> {
    Ok(Json(
        CourseService::list_by_category_name(&state.db, &name).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/courses/highest-rated/category/{category}",
    params(("category" = i64, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Best rated course in the category", body = Course),
        (status = 404, description = "Category has no courses", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, _caller))]
pub async fn highest_rated_in_category(
    State(state): State<AppState>,
    RequireMember(_caller): RequireMember,
    Path(category): Path<i64>,
) -> Result<Json<Course>, AppError> {
    Ok(Json(
        CourseService::highest_rated_in_category(&state.db, category).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/courses/highest-rated/category-name/{name}",
    params(("name" = String, Path, description = "Category name, any case")),
    responses(
        (status = 200, description = "Best rated course in the category", body = Course),
        (status = 404, description = "Category has no courses", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, _caller))]
pub async fn highest_rated_in_category_name(
    State(state): State<AppState>,
    RequireMember(_caller): RequireMember,
    Path(name): Path<String>,
) -> Result<Json<Course>, AppError> {
    Ok(Json(
        CourseService::highest_rated_in_category_name(&state.db, &name).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/courses/highest-rated/category/{category}/instructor/{instructor}",
    params(
        ("category" = String, Path, description = "Category name, any case"),
        ("instructor" = String, Path, description = "Instructor name, any case")
    ),
    responses((status = 200, description = "The instructor's courses in the category, best rated first", body = Vec<Course>)),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, _caller))]
pub async fn rated_by_category_and_instructor(
    State(state): State<AppState>,
    RequireMember(_caller): RequireMember,
    Path((category, instructor)): Path<(String, String)>,
) -> Result<Json<Vec<Course>>, AppError> {
    Ok(Json(
        CourseService::rated_by_category_and_instructor(&state.db, &category, &instructor)
            .await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/courses/courses-sorted-by-rate",
    responses((status = 200, description = "All courses, best rated first; unrated last", body = Vec<Course>)),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, _caller))]
pub async fn list_sorted_by_rate(
    State(state): State<AppState>,
    RequireMember(_caller): RequireMember,
) -> Result<Json<Vec<Course>>, AppError> {
    Ok(Json(CourseService::list_sorted_by_rate(&state.db).await?))
}

#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = CreateCourseDto,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "Instructor not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, caller, dto), fields(admin_id = caller.principal_id))]
pub async fn create_course(
    State(state): State<AppState>,
    RequireAdmin(caller): RequireAdmin,
    ValidatedJson(dto): ValidatedJson<CreateCourseDto>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    let course = CourseService::create_course(&state.db, &dto).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

#[utoipa::path(
    put,
    path = "/api/courses/{id}",
    params(("id" = i64, Path, description = "Course ID")),
    request_body = UpdateCourseDto,
    responses(
        (status = 200, description = "Course updated", body = Course),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, caller, dto), fields(admin_id = caller.principal_id))]
pub async fn update_course(
    State(state): State<AppState>,
    RequireAdmin(caller): RequireAdmin,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateCourseDto>,
) -> Result<Json<Course>, AppError> {
    Ok(Json(CourseService::update_course(&state.db, id, &dto).await?))
}

#[utoipa::path(
    delete,
    path = "/api/courses/{id}",
    params(("id" = i64, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course deleted", body = MessageResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, caller), fields(admin_id = caller.principal_id))]
pub async fn delete_course(
    State(state): State<AppState>,
    RequireAdmin(caller): RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    CourseService::delete_course(&state.db, id).await?;
    Ok(Json(MessageResponse::ok("Course deleted successfully")))
}
