use axum::{Router, routing::get};

use super::controller::{
    create_instructor, delete_instructor, delete_instructor_by_email, exists_by_email,
    exists_by_id, exists_by_phone, get_instructor, get_instructor_by_email, instructor_rating,
    list_instructors, update_instructor,
};
use crate::state::AppState;

pub fn init_instructors_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_instructors).post(create_instructor))
        .route(
            "/{id}",
            get(get_instructor)
                .put(update_instructor)
                .delete(delete_instructor),
        )
        .route(
            "/email/{email}",
            get(get_instructor_by_email).delete(delete_instructor_by_email),
        )
        .route("/exists/email/{email}", get(exists_by_email))
        .route("/exists/phone/{phone}", get(exists_by_phone))
        .route("/exists/id/{id}", get(exists_by_id))
        .route("/rating/{id}", get(instructor_rating))
}
