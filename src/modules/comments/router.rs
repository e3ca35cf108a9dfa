use axum::{
    Router,
    routing::{get, post, put},
};

use super::controller::{
    create_comment, delete_comment, list_comments_for_course, list_comments_for_student,
    list_comments_for_student_and_course, update_comment,
};
use crate::state::AppState;

pub fn init_comments_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_comment))
        .route("/{id}", put(update_comment).delete(delete_comment))
        .route("/course/{id}", get(list_comments_for_course))
        .route("/student/{id}", get(list_comments_for_student))
        .route(
            "/student/{id}/course/{course_id}",
            get(list_comments_for_student_and_course),
        )
}
