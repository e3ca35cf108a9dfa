//! Authentication and authorization middleware.
//!
//! # Flow
//!
//! 1. [`auth::authenticate`] runs on every `/api` request. A valid bearer token
//!    becomes an [`auth::AuthContext`] in the request extensions; an invalid
//!    one ends the request with 401; no token passes through.
//! 2. [`role`] policies run before handlers and return 403 unless the context
//!    is present and holds a required role.
//!
//! ```ignore
//! use crate::middleware::role::{RequireAdmin, RequireMember};
//!
//! async fn list_categories(RequireMember(caller): RequireMember) -> impl IntoResponse {
//!     // any USER or ADMIN
//! }
//!
//! async fn create_category(RequireAdmin(caller): RequireAdmin) -> impl IntoResponse {
//!     // ADMIN only
//! }
//! ```

pub mod auth;
pub mod role;
