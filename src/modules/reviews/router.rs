use axum::{
    Router,
    routing::{get, put},
};

use super::controller::{
    course_average, create_review, delete_review, instructor_average, list_reviews,
    list_reviews_for_course, list_reviews_for_instructor_and_category, list_reviews_for_student,
    list_reviews_for_student_and_course, update_review,
};
use crate::state::AppState;

pub fn init_reviews_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reviews).post(create_review))
        .route("/{id}", put(update_review).delete(delete_review))
        .route("/course/{id}", get(list_reviews_for_course))
        .route("/course/{id}/average", get(course_average))
        .route("/student/{id}", get(list_reviews_for_student))
        .route(
            "/student/{id}/course/{course_title}",
            get(list_reviews_for_student_and_course),
        )
        .route(
            "/instructor/{instructor}/category/{category}",
            get(list_reviews_for_instructor_and_category),
        )
        .route("/instructor/{instructor}/average", get(instructor_average))
}
