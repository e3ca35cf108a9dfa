pub mod auth;
pub mod categories;
pub mod comments;
pub mod courses;
pub mod enrollments;
pub mod instructors;
pub mod reviews;
pub mod students;
