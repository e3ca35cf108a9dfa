use axum::{Router, routing::post};

use super::controller::{login, register_instructor, register_student};
use crate::state::AppState;

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/register/student", post(register_student))
        .route("/register/instructor", post(register_instructor))
}
