use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use scholarly_core::{AppError, ErrorResponse};
use scholarly_models::{EnrollQuery, Enrollment};

use super::service::EnrollmentService;
use crate::state::AppState;

/// 204 for an empty list, otherwise the list itself.
fn list_or_no_content(enrollments: Vec<Enrollment>) -> Response {
    if enrollments.is_empty() {
        StatusCode::NO_CONTENT.into_response()
    } else {
        Json(enrollments).into_response()
    }
}

#[utoipa::path(
    post,
    path = "/api/enrollments/enroll",
    params(EnrollQuery),
    responses(
        (status = 201, description = "Student enrolled", body = Enrollment),
        (status = 400, description = "Already enrolled", body = ErrorResponse),
        (status = 404, description = "Student or course not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state))]
pub async fn enroll(
    State(state): State<AppState>,
    Query(query): Query<EnrollQuery>,
) -> Result<(StatusCode, Json<Enrollment>), AppError> {
    let enrollment =
        EnrollmentService::enroll(&state.db, &state.mailer, query.student_id, query.course_id)
            .await?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

#[utoipa::path(
    delete,
    path = "/api/enrollments/{id}",
    params(("id" = i64, Path, description = "Enrollment ID")),
    responses(
        (status = 204, description = "Enrollment cancelled"),
        (status = 404, description = "Enrollment not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state))]
pub async fn cancel_enrollment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    EnrollmentService::cancel(&state.db, &state.mailer, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/enrollments/student/{id}",
    params(("id" = i64, Path, description = "Student ID")),
    responses(
        (status = 200, description = "The student's enrollments", body = Vec<Enrollment>),
        (status = 204, description = "No enrollments")
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state))]
pub async fn list_for_student(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let enrollments = EnrollmentService::list_for_student(&state.db, id).await?;
    Ok(list_or_no_content(enrollments))
}

#[utoipa::path(
    get,
    path = "/api/enrollments/course/{id}",
    params(("id" = i64, Path, description = "Course ID")),
    responses(
        (status = 200, description = "The course's enrollments", body = Vec<Enrollment>),
        (status = 204, description = "No enrollments")
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state))]
pub async fn list_for_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let enrollments = EnrollmentService::list_for_course(&state.db, id).await?;
    Ok(list_or_no_content(enrollments))
}

#[utoipa::path(
    get,
    path = "/api/enrollments/student/{id}/course/{course_id}",
    params(
        ("id" = i64, Path, description = "Student ID"),
        ("course_id" = i64, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Enrollment found", body = Enrollment),
        (status = 404, description = "Student is not enrolled in the course", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state))]
pub async fn get_for_student_and_course(
    State(state): State<AppState>,
    Path((id, course_id)): Path<(i64, i64)>,
) -> Result<Json<Enrollment>, AppError> {
    Ok(Json(
        EnrollmentService::find_for_student_and_course(&state.db, id, course_id).await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn empty_list_is_no_content() {
        assert_eq!(list_or_no_content(vec![]).status(), StatusCode::NO_CONTENT);

        let enrollment = Enrollment {
            id: 1,
            student_id: 2,
            student_name: "Ada".to_string(),
            course_id: 3,
            course_title: "Rust".to_string(),
            enrollment_date: Utc::now(),
        };
        assert_eq!(list_or_no_content(vec![enrollment]).status(), StatusCode::OK);
    }
}
