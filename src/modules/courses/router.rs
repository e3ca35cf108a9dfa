use axum::{Router, routing::get};

use super::controller::{
    create_course, delete_course, get_course, get_course_by_title, highest_rated_in_category,
    highest_rated_in_category_name, list_by_category, list_by_category_name, list_by_instructor,
    list_courses, list_sorted_by_rate, rated_by_category_and_instructor, search_courses,
    update_course,
};
use crate::state::AppState;

pub fn init_courses_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route("/title", get(get_course_by_title))
        .route("/search", get(search_courses))
        .route("/courses-sorted-by-rate", get(list_sorted_by_rate))
        .route("/category/{category_id}", get(list_by_category))
        .route("/category-name/{name}", get(list_by_category_name))
        .route("/instructor/{instructor_id}", get(list_by_instructor))
        .route(
            "/highest-rated/category/{category}",
            get(highest_rated_in_category),
        )
        .route(
            "/highest-rated/category/{category}/instructor/{instructor}",
            get(rated_by_category_and_instructor),
        )
        .route(
            "/highest-rated/category-name/{name}",
            get(highest_rated_in_category_name),
        )
        .route(
            "/{id}",
            get(get_course).put(update_course).delete(delete_course),
        )
}
