mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

use common::{
    create_test_course, create_test_instructor, create_test_student, expect_status,
    generate_unique_email, send, setup_test_app, student_body,
};

#[sqlx::test(migrations = "./migrations")]
async fn test_create_and_fetch_student(pool: PgPool) {
    let caller = create_test_student(&pool).await;
    let app = setup_test_app(pool);
    let email = generate_unique_email();

    let response = send(&app, "POST", "/api/students", Some(&caller.token), Some(student_body(&email))).await;
    let body = expect_status(response, StatusCode::CREATED).await;
    let id = body["data"]["id"].as_i64().unwrap();
    let phone = body["data"]["phoneNumber"].as_str().unwrap().to_string();

    let response = send(&app, "GET", &format!("/api/students/{id}"), Some(&caller.token), None).await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["email"], email);

    let response = send(
        &app,
        "GET",
        &format!("/api/students/phone?phoneNumber={}", phone.replace('+', "%2B")),
        Some(&caller.token),
        None,
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["id"], id);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_students_combines_filters(pool: PgPool) {
    let caller = create_test_student(&pool).await;
    let app = setup_test_app(pool);

    for (name, age, gender) in [("Ada", 21, "FEMALE"), ("Ada", 30, "FEMALE"), ("Alan", 21, "MALE")] {
        let mut body = student_body(&generate_unique_email());
        body["name"] = json!(name);
        body["age"] = json!(age);
        body["gender"] = json!(gender);
        let response = send(&app, "POST", "/api/students", Some(&caller.token), Some(body)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = send(&app, "GET", "/api/students?name=ada&age=21", Some(&caller.token), None).await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let response = send(&app, "GET", "/api/students?gender=male", Some(&caller.token), None).await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["name"], "Alan");

    let response = send(&app, "GET", "/api/students?gender=robot", Some(&caller.token), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_student_rechecks_uniqueness(pool: PgPool) {
    let caller = create_test_student(&pool).await;
    let instructor = create_test_instructor(&pool, "Someone").await;
    let app = setup_test_app(pool);

    let email = generate_unique_email();
    let response = send(&app, "POST", "/api/students", Some(&caller.token), Some(student_body(&email))).await;
    let created = expect_status(response, StatusCode::CREATED).await;
    let id = created["data"]["id"].as_i64().unwrap();

    let mut update = student_body(&email);
    update["phoneNumber"] = created["data"]["phoneNumber"].clone();
    update["name"] = json!("Ada Byron");
    update["gender"] = json!("Male");
    let response = send(&app, "PUT", &format!("/api/students/{id}"), Some(&caller.token), Some(update)).await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["name"], "Ada Byron");
    assert_eq!(body["data"]["gender"], "MALE");

    let response = send(
        &app,
        "PUT",
        &format!("/api/students/{id}"),
        Some(&caller.token),
        Some(student_body(&instructor.email)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app, "PUT", "/api/students/999999", Some(&caller.token), Some(student_body(&generate_unique_email()))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_student(pool: PgPool) {
    let caller = create_test_student(&pool).await;
    let victim = create_test_student(&pool).await;
    let app = setup_test_app(pool);

    let uri = format!("/api/students/{}", victim.id);
    let response = send(&app, "DELETE", &uri, Some(&caller.token), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, "DELETE", &uri, Some(&caller.token), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, "DELETE", "/api/students/phone?phoneNumber=000", Some(&caller.token), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_enroll_through_student_route(pool: PgPool) {
    let student = create_test_student(&pool).await;
    let instructor = create_test_instructor(&pool, "Teacher").await;
    let course_id = create_test_course(&pool, instructor.id, "Rust 101", "Programming").await;
    let app = setup_test_app(pool);

    let uri = format!("/api/students/{}/courses/{}", student.id, course_id);
    let response = send(&app, "POST", &uri, Some(&student.token), None).await;
    let body = expect_status(response, StatusCode::CREATED).await;
    assert_eq!(body["courseTitle"], "Rust 101");

    let response = send(&app, "POST", &uri, Some(&student.token), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
