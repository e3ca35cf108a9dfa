use axum::{
    Router,
    routing::{delete, get, post},
};

use super::controller::{
    cancel_enrollment, enroll, get_for_student_and_course, list_for_course, list_for_student,
};
use crate::state::AppState;

pub fn init_enrollments_router() -> Router<AppState> {
    Router::new()
        .route("/enroll", post(enroll))
        .route("/{id}", delete(cancel_enrollment))
        .route("/student/{id}", get(list_for_student))
        .route(
            "/student/{id}/course/{course_id}",
            get(get_for_student_and_course),
        )
        .route("/course/{id}", get(list_for_course))
}
