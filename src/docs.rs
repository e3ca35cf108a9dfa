use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use scholarly_auth::Role;
use scholarly_core::ErrorResponse;
use scholarly_models::{
    AuthResponse, Category, Comment, Course, CreateCategoryDto, CreateCommentDto, CreateCourseDto,
    CreateInstructorDto, CreateReviewDto, CreateStudentDto, Enrollment, Instructor, LoginRequest,
    MessageResponse, Review, Student, StudentListResponse, StudentResponse, UpdateCommentDto,
    UpdateCourseDto, UpdateReviewDto,
};

use crate::modules::{
    auth, categories, comments, courses, enrollments, instructors, reviews, students,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::controller::login,
        auth::controller::register_student,
        auth::controller::register_instructor,
        students::controller::list_students,
        students::controller::get_student,
        students::controller::get_student_by_email,
        students::controller::get_student_by_phone,
        students::controller::create_student,
        students::controller::update_student,
        students::controller::delete_student,
        students::controller::delete_student_by_phone,
        students::controller::enroll_student,
        instructors::controller::list_instructors,
        instructors::controller::get_instructor,
        instructors::controller::get_instructor_by_email,
        instructors::controller::create_instructor,
        instructors::controller::update_instructor,
        instructors::controller::delete_instructor,
        instructors::controller::delete_instructor_by_email,
        instructors::controller::exists_by_email,
        instructors::controller::exists_by_phone,
        instructors::controller::exists_by_id,
        instructors::controller::instructor_rating,
        categories::controller::list_categories,
        categories::controller::get_category,
        categories::controller::create_category,
        categories::controller::delete_category,
        courses::controller::list_courses,
        courses::controller::get_course,
        courses::controller::get_course_by_title,
        courses::controller::list_by_category,
        courses::controller::list_by_instructor,
        courses::controller::search_courses,
        courses::controller::list_by_category_name,
        courses::controller::highest_rated_in_category,
        courses::controller::highest_rated_in_category_name,
        courses::controller::rated_by_category_and_instructor,
        courses::controller::list_sorted_by_rate,
        courses::controller::create_course,
        courses::controller::update_course,
        courses::controller::delete_course,
        enrollments::controller::enroll,
        enrollments::controller::cancel_enrollment,
        enrollments::controller::list_for_student,
        enrollments::controller::list_for_course,
        enrollments::controller::get_for_student_and_course,
        reviews::controller::list_reviews,
        reviews::controller::list_reviews_for_course,
        reviews::controller::list_reviews_for_student,
        reviews::controller::list_reviews_for_student_and_course,
        reviews::controller::list_reviews_for_instructor_and_category,
        reviews::controller::course_average,
        reviews::controller::instructor_average,
        reviews::controller::create_review,
        reviews::controller::update_review,
        reviews::controller::delete_review,
        comments::controller::create_comment,
        comments::controller::update_comment,
        comments::controller::delete_comment,
        comments::controller::list_comments_for_course,
        comments::controller::list_comments_for_student,
        comments::controller::list_comments_for_student_and_course,
    ),
    components(
        schemas(
            Role,
            ErrorResponse,
            MessageResponse,
            LoginRequest,
            AuthResponse,
            Student,
            CreateStudentDto,
            StudentResponse,
            StudentListResponse,
            Instructor,
            CreateInstructorDto,
            Category,
            CreateCategoryDto,
            Course,
            CreateCourseDto,
            UpdateCourseDto,
            Enrollment,
            Review,
            CreateReviewDto,
            UpdateReviewDto,
            Comment,
            CreateCommentDto,
            UpdateCommentDto,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login and self-registration"),
        (name = "Students", description = "Student accounts"),
        (name = "Instructors", description = "Instructor accounts, admin only"),
        (name = "Categories", description = "Course categories"),
        (name = "Courses", description = "Course catalog and rankings"),
        (name = "Enrollments", description = "Student enrollments"),
        (name = "Reviews", description = "Course reviews and ratings"),
        (name = "Comments", description = "Course comments and discussions")
    ),
    info(
        title = "Scholarly API",
        version = "0.1.0",
        description = "Learning management REST API built with Rust, Axum, and PostgreSQL, secured with JWT bearer tokens.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
