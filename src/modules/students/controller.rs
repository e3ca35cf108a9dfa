use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use scholarly_core::{AppError, ErrorResponse};
use scholarly_models::{
    CreateStudentDto, EmailQuery, Enrollment, MessageResponse, PhoneQuery, StudentFilter,
    StudentListResponse, StudentResponse, UpdateStudentDto,
};

use super::service::StudentService;
use crate::modules::enrollments::service::EnrollmentService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/students",
    params(StudentFilter),
    responses(
        (status = 200, description = "Students matching every supplied filter", body = StudentListResponse),
        (status = 400, description = "Unknown gender filter", body = ErrorResponse),
        (status = 401, description = "Invalid or expired token", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn list_students(
    State(state): State<AppState>,
    Query(filter): Query<StudentFilter>,
) -> Result<Json<StudentListResponse>, AppError> {
    let students = StudentService::list_students(&state.db, &filter).await?;
    Ok(Json(StudentListResponse::new(
        students,
        "Students retrieved successfully",
    )))
}

#[utoipa::path(
    get,
    path = "/api/students/{id}",
    params(("id" = i64, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student found", body = StudentResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<StudentResponse>, AppError> {
    let student = StudentService::get_student(&state.db, id).await?;
    Ok(Json(StudentResponse::new(student, "Student found")))
}

#[utoipa::path(
    get,
    path = "/api/students/email",
    params(EmailQuery),
    responses(
        (status = 200, description = "Student found", body = StudentResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn get_student_by_email(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<StudentResponse>, AppError> {
    let student = StudentService::get_student_by_email(&state.db, &query.email).await?;
    Ok(Json(StudentResponse::new(student, "Student found")))
}

#[utoipa::path(
    get,
    path = "/api/students/phone",
    params(PhoneQuery),
    responses(
        (status = 200, description = "Student found", body = StudentResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn get_student_by_phone(
    State(state): State<AppState>,
    Query(query): Query<PhoneQuery>,
) -> Result<Json<StudentResponse>, AppError> {
    let student = StudentService::get_student_by_phone(&state.db, &query.phone_number).await?;
    Ok(Json(StudentResponse::new(student, "Student found")))
}

#[utoipa::path(
    post,
    path = "/api/students",
    request_body = CreateStudentDto,
    responses(
        (status = 201, description = "Student created", body = StudentResponse),
        (status = 400, description = "Email or phone number already in use", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, dto))]
pub async fn create_student(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateStudentDto>,
) -> Result<(StatusCode, Json<StudentResponse>), AppError> {
    let student = StudentService::create_student(&state.db, &dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(StudentResponse::new(student, "Student created successfully")),
    ))
}

#[utoipa::path(
    put,
    path = "/api/students/{id}",
    params(("id" = i64, Path, description = "Student ID")),
    request_body = CreateStudentDto,
    responses(
        (status = 200, description = "Student updated", body = StudentResponse),
        (status = 400, description = "Email or phone number already in use", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, dto))]
pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateStudentDto>,
) -> Result<Json<StudentResponse>, AppError> {
    let student = StudentService::update_student(&state.db, id, &dto).await?;
    Ok(Json(StudentResponse::new(student, "Student updated successfully")))
}

#[utoipa::path(
    delete,
    path = "/api/students/{id}",
    params(("id" = i64, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student deleted", body = MessageResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    StudentService::delete_student(&state.db, id).await?;
    Ok(Json(MessageResponse::ok("Student deleted successfully")))
}

#[utoipa::path(
    delete,
    path = "/api/students/phone",
    params(PhoneQuery),
    responses(
        (status = 200, description = "Student deleted", body = MessageResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn delete_student_by_phone(
    State(state): State<AppState>,
    Query(query): Query<PhoneQuery>,
) -> Result<Json<MessageResponse>, AppError> {
    StudentService::delete_student_by_phone(&state.db, &query.phone_number).await?;
    Ok(Json(MessageResponse::ok("Student deleted successfully")))
}

#[utoipa::path(
    post,
    path = "/api/students/{id}/courses/{course_id}",
    params(
        ("id" = i64, Path, description = "Student ID"),
        ("course_id" = i64, Path, description = "Course ID")
    ),
    responses(
        (status = 201, description = "Student enrolled", body = Enrollment),
        (status = 400, description = "Already enrolled", body = ErrorResponse),
        (status = 404, description = "Student or course not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn enroll_student(
    State(state): State<AppState>,
    Path((id, course_id)): Path<(i64, i64)>,
) -> Result<(StatusCode, Json<Enrollment>), AppError> {
    let enrollment = EnrollmentService::enroll(&state.db, &state.mailer, id, course_id).await?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}
