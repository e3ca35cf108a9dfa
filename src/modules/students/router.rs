use axum::{
    Router,
    routing::{get, post},
};

use super::controller::{
    create_student, delete_student, delete_student_by_phone, enroll_student, get_student,
    get_student_by_email, get_student_by_phone, list_students, update_student,
};
use crate::state::AppState;

pub fn init_students_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_students).post(create_student))
        .route("/email", get(get_student_by_email))
        .route(
            "/phone",
            get(get_student_by_phone).delete(delete_student_by_phone),
        )
        .route(
            "/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route("/{id}/courses/{course_id}", post(enroll_student))
}
