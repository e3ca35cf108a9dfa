//! # Scholarly Models
//!
//! Database rows, request bodies, and response envelopes for the Scholarly API.
//!
//! Wire format is camelCase JSON (`phoneNumber`, `courseUrl`, `isDiscussion`).
//!
//! - [`auth`]: login and registration responses
//! - [`students`], [`instructors`]: principal records and their DTOs
//! - [`categories`], [`courses`]: the course catalog
//! - [`enrollments`], [`reviews`], [`comments`]: student activity
//! - [`common`]: shared envelopes and field validators

pub mod auth;
pub mod categories;
pub mod comments;
pub mod common;
pub mod courses;
pub mod enrollments;
pub mod instructors;
pub mod reviews;
pub mod students;

pub use auth::{AuthResponse, LoginRequest};
pub use categories::{Category, CreateCategoryDto};
pub use comments::{Comment, CreateCommentDto, UpdateCommentDto};
pub use common::{MessageResponse, normalize_gender};
pub use courses::{Course, CreateCourseDto, SearchQuery, TitleQuery, UpdateCourseDto};
pub use enrollments::{EnrollQuery, Enrollment};
pub use instructors::{CreateInstructorDto, Instructor, UpdateInstructorDto};
pub use reviews::{CreateReviewDto, Review, UpdateReviewDto};
pub use students::{
    CreateStudentDto, EmailQuery, PhoneQuery, Student, StudentFilter, StudentListResponse,
    StudentResponse, UpdateStudentDto,
};
