mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

use common::{
    PASSWORD, create_test_instructor, create_test_student, expect_status, generate_unique_email,
    generate_unique_phone, send, setup_test_app, student_body, test_jwt_config,
};
use scholarly::modules::auth::error::AuthError;
use scholarly::modules::auth::service::{AuthService, map_unique_violation};
use scholarly_auth::{Role, TokenCodec};
use scholarly_models::instructors::CreateInstructorDto;
use scholarly_models::students::CreateStudentDto;

fn instructor_body(email: &str, phone: &str) -> serde_json::Value {
    json!({
        "name": "Barbara Liskov",
        "age": 50,
        "gender": "FEMALE",
        "email": email,
        "phoneNumber": phone,
        "password": PASSWORD
    })
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_success_issues_role_token(pool: PgPool) {
    let student = create_test_student(&pool).await;
    let app = setup_test_app(pool);

    let response = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": student.email, "password": PASSWORD})),
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Login successful");

    let claims = TokenCodec::new(&test_jwt_config())
        .verify(body["token"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.subject(), student.email);
    assert_eq!(claims.roles(), &[Role::User]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_matches_email_ignoring_case(pool: PgPool) {
    let instructor = create_test_instructor(&pool, "Grace Hopper").await;
    let app = setup_test_app(pool);

    let response = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": format!("  {}  ", instructor.email.to_uppercase()), "password": PASSWORD})),
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;

    let claims = TokenCodec::new(&test_jwt_config())
        .verify(body["token"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.roles(), &[Role::Admin]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_failures_are_indistinguishable(pool: PgPool) {
    let student = create_test_student(&pool).await;
    let app = setup_test_app(pool);

    let wrong_password = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": student.email, "password": "wrong-password"})),
    )
    .await;
    let wrong_password = expect_status(wrong_password, StatusCode::UNAUTHORIZED).await;

    let unknown_email = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "nobody@test.com", "password": "wrong-password"})),
    )
    .await;
    let unknown_email = expect_status(unknown_email, StatusCode::UNAUTHORIZED).await;

    assert_eq!(wrong_password, unknown_email);
    assert_eq!(
        wrong_password["error"],
        "Invalid credentials: Incorrect email or password."
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_student_returns_usable_token(pool: PgPool) {
    let app = setup_test_app(pool);
    let email = generate_unique_email();

    let response = send(
        &app,
        "POST",
        "/api/auth/register/student",
        None,
        Some(student_body(&email)),
    )
    .await;
    let body = expect_status(response, StatusCode::CREATED).await;
    assert_eq!(body["message"], "Student registered and logged in successfully.");
    let token = body["token"].as_str().unwrap().to_string();

    let response = send(
        &app,
        "GET",
        &format!("/api/students/email?email={}", email),
        Some(&token),
        None,
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["gender"], "FEMALE");
    assert!(body["data"].get("password").is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_instructor_gets_admin_role(pool: PgPool) {
    let app = setup_test_app(pool);
    let email = generate_unique_email();

    let response = send(
        &app,
        "POST",
        "/api/auth/register/instructor",
        None,
        Some(instructor_body(&email, &generate_unique_phone())),
    )
    .await;
    let body = expect_status(response, StatusCode::CREATED).await;
    let token = body["token"].as_str().unwrap().to_string();

    let claims = TokenCodec::new(&test_jwt_config()).verify(&token).unwrap();
    assert_eq!(claims.subject(), email);
    assert_eq!(claims.roles(), &[Role::Admin]);

    let response = send(&app, "GET", "/api/instructors", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_instructor_rejects_duplicate_email(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let email = generate_unique_email();

    let first = send(
        &app,
        "POST",
        "/api/auth/register/instructor",
        None,
        Some(instructor_body(&email, &generate_unique_phone())),
    )
    .await;
    expect_status(first, StatusCode::CREATED).await;

    let second = send(
        &app,
        "POST",
        "/api/auth/register/instructor",
        None,
        Some(instructor_body(&email.to_uppercase(), &generate_unique_phone())),
    )
    .await;
    let body = expect_status(second, StatusCode::BAD_REQUEST).await;
    assert!(body["error"].as_str().unwrap().contains("already exists"));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM instructors WHERE email = $1")
        .bind(&email)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_rejects_duplicate_phone_number(pool: PgPool) {
    let app = setup_test_app(pool);
    let phone = generate_unique_phone();

    let first = send(
        &app,
        "POST",
        "/api/auth/register/instructor",
        None,
        Some(instructor_body(&generate_unique_email(), &phone)),
    )
    .await;
    expect_status(first, StatusCode::CREATED).await;

    let again = send(
        &app,
        "POST",
        "/api/auth/register/instructor",
        None,
        Some(instructor_body(&generate_unique_email(), &phone)),
    )
    .await;
    let body = expect_status(again, StatusCode::BAD_REQUEST).await;
    assert!(body["error"].as_str().unwrap().contains("phone number"));

    let mut student = student_body(&generate_unique_email());
    student["phoneNumber"] = json!(phone);
    let response = send(&app, "POST", "/api/auth/register/student", None, Some(student)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_registrations_cannot_share_an_email(pool: PgPool) {
    let email = generate_unique_email();
    let student: CreateStudentDto = serde_json::from_value(student_body(&email)).unwrap();
    let instructor: CreateInstructorDto =
        serde_json::from_value(instructor_body(&email, &generate_unique_phone())).unwrap();

    let (as_student, as_instructor) = tokio::join!(
        AuthService::create_student(&pool, &student),
        AuthService::create_instructor(&pool, &instructor),
    );

    match (as_student, as_instructor) {
        (Ok(_), Err(AuthError::AlreadyExists(_))) | (Err(AuthError::AlreadyExists(_)), Ok(_)) => {}
        (student, instructor) => panic!(
            "expected exactly one registration to win: student={:?} instructor={:?}",
            student.map(|s| s.id),
            instructor.map(|i| i.id)
        ),
    }

    let shared: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM students s JOIN instructors i ON i.email = s.email",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(shared, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_store_rejects_contacts_shared_across_tables(pool: PgPool) {
    let student = create_test_student(&pool).await;
    let instructor = create_test_instructor(&pool, "Taken").await;

    let err = sqlx::query("UPDATE students SET email = $1 WHERE id = $2")
        .bind(&instructor.email)
        .bind(student.id)
        .execute(&pool)
        .await
        .unwrap_err();
    assert!(matches!(map_unique_violation(err), AuthError::AlreadyExists(_)));

    // Freed contacts can be taken by the other table.
    sqlx::query("DELETE FROM instructors WHERE id = $1")
        .bind(instructor.id)
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("UPDATE students SET email = $1 WHERE id = $2")
        .bind(&instructor.email)
        .bind(student.id)
        .execute(&pool)
        .await
        .unwrap();

    let owner: String = sqlx::query_scalar(
        "SELECT principal_kind FROM principal_contacts WHERE email = $1",
    )
    .bind(&instructor.email)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(owner, "student");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_rejects_email_used_by_other_principal_kind(pool: PgPool) {
    let instructor = create_test_instructor(&pool, "Taken").await;
    let app = setup_test_app(pool);

    let response = send(
        &app,
        "POST",
        "/api/auth/register/student",
        None,
        Some(student_body(&instructor.email)),
    )
    .await;
    let body = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert!(body["error"].as_str().unwrap().contains("already exists"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_validates_body(pool: PgPool) {
    let app = setup_test_app(pool);

    let mut body = student_body(&generate_unique_email());
    body["gender"] = json!("other");
    let response = send(&app, "POST", "/api/auth/register/student", None, Some(body)).await;
    let body = expect_status(response, StatusCode::UNPROCESSABLE_ENTITY).await;
    assert_eq!(body["error"], "gender must be MALE or FEMALE");

    let response = send(
        &app,
        "POST",
        "/api/auth/register/student",
        None,
        Some(json!({"name": "No Email"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_token_for_deleted_principal_is_unauthorized(pool: PgPool) {
    let student = create_test_student(&pool).await;
    sqlx::query("DELETE FROM students WHERE id = $1")
        .bind(student.id)
        .execute(&pool)
        .await
        .unwrap();
    let app = setup_test_app(pool);

    let response = send(&app, "GET", "/api/courses", Some(&student.token), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_roles_come_from_store_not_claims(pool: PgPool) {
    let student = create_test_student(&pool).await;
    let forged = TokenCodec::new(&test_jwt_config())
        .issue_now(&student.email, &[Role::Admin])
        .unwrap();
    let app = setup_test_app(pool);

    let response = send(&app, "GET", "/api/instructors", Some(&forged), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
