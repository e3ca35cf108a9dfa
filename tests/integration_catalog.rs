mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

use common::{
    create_test_course, create_test_instructor, create_test_student, expect_status, send,
    setup_test_app,
};

#[sqlx::test(migrations = "./migrations")]
async fn test_category_writes_require_admin(pool: PgPool) {
    let student = create_test_student(&pool).await;
    let instructor = create_test_instructor(&pool, "Admin").await;
    let app = setup_test_app(pool);

    let response = send(&app, "POST", "/api/categories", Some(&student.token), Some(json!({"name": "Math"}))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(&app, "POST", "/api/categories", Some(&instructor.token), Some(json!({"name": "Math"}))).await;
    let created = expect_status(response, StatusCode::CREATED).await;

    let response = send(&app, "POST", "/api/categories", Some(&instructor.token), Some(json!({"name": "MATH"}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app, "GET", "/api/categories", Some(&student.token), None).await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let uri = format!("/api/categories/{}", created["id"]);
    let response = send(&app, "DELETE", &uri, Some(&student.token), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = send(&app, "DELETE", &uri, Some(&instructor.token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = send(&app, "GET", &uri, Some(&student.token), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_course_reuses_category_ignoring_case(pool: PgPool) {
    let instructor = create_test_instructor(&pool, "Linus Torvalds").await;
    let app = setup_test_app(pool);

    let mut category_ids = Vec::new();
    for (title, category) in [("Kernels", "Systems"), ("Git Internals", "SYSTEMS")] {
        let response = send(
            &app,
            "POST",
            "/api/courses",
            Some(&instructor.token),
            Some(json!({
                "title": title,
                "description": "Deep dive",
                "courseUrl": "https://courses.test/c",
                "instructorId": instructor.id,
                "categoryName": category
            })),
        )
        .await;
        let body = expect_status(response, StatusCode::CREATED).await;
        assert_eq!(body["instructorName"], "Linus Torvalds");
        assert_eq!(body["categoryName"], "Systems");
        assert!(body["averageRate"].is_null());
        category_ids.push(body["categoryId"].as_i64().unwrap());
    }
    assert_eq!(category_ids[0], category_ids[1]);

    let response = send(
        &app,
        "POST",
        "/api/courses",
        Some(&instructor.token),
        Some(json!({
            "title": "Orphan",
            "description": "x",
            "courseUrl": "https://courses.test/o",
            "instructorId": 999999,
            "categoryName": "Systems"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_course_title_lookup_and_search(pool: PgPool) {
    let student = create_test_student(&pool).await;
    let instructor = create_test_instructor(&pool, "Grace Hopper").await;
    create_test_course(&pool, instructor.id, "Compiler Design", "CS").await;
    create_test_course(&pool, instructor.id, "COBOL Basics", "CS").await;
    let app = setup_test_app(pool);

    let response = send(&app, "GET", "/api/courses/title?title=compiler%20design", Some(&student.token), None).await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["title"], "Compiler Design");

    let response = send(&app, "GET", "/api/courses/title?title=CompilerDesign", Some(&student.token), None).await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["title"], "Compiler Design");

    let response = send(&app, "GET", "/api/courses/title?title=Nope", Some(&student.token), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, "GET", "/api/courses/search?query=cobolbasics", Some(&student.token), None).await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let response = send(&app, "GET", "/api/courses/search?query=gracehopper", Some(&student.token), None).await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let response = send(&app, "GET", "/api/courses/search?query=unknown", Some(&student.token), None).await;
    let body = expect_status(response, StatusCode::OK).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_highest_rated_queries(pool: PgPool) {
    let student = create_test_student(&pool).await;
    let instructor = create_test_instructor(&pool, "Ken Thompson").await;
    let unrated = create_test_course(&pool, instructor.id, "Unix", "Systems").await;
    let good = create_test_course(&pool, instructor.id, "C", "Systems").await;
    let better = create_test_course(&pool, instructor.id, "Go", "Systems").await;
    for (course, rate) in [(good, 3.5), (better, 4.5)] {
        sqlx::query("UPDATE courses SET average_rate = $1 WHERE id = $2")
            .bind(rate)
            .bind(course)
            .execute(&pool)
            .await
            .unwrap();
    }
    let category_id: i64 = sqlx::query_scalar("SELECT category_id FROM courses WHERE id = $1")
        .bind(unrated)
        .fetch_one(&pool)
        .await
        .unwrap();
    let app = setup_test_app(pool);

    let response = send(&app, "GET", &format!("/api/courses/highest-rated/category/{category_id}"), Some(&student.token), None).await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["id"], better);

    let response = send(&app, "GET", "/api/courses/highest-rated/category-name/systems", Some(&student.token), None).await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["id"], better);

    let response = send(
        &app,
        "GET",
        "/api/courses/highest-rated/category/Systems/instructor/ken%20thompson",
        Some(&student.token),
        None,
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    let ids: Vec<i64> = body.as_array().unwrap().iter().map(|c| c["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![better, good, unrated]);

    let response = send(&app, "GET", "/api/courses/courses-sorted-by-rate", Some(&student.token), None).await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body[0]["id"], better);
    assert_eq!(body[2]["id"], unrated);

    let response = send(&app, "GET", "/api/courses/highest-rated/category-name/empty", Some(&student.token), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_course_writes_require_admin(pool: PgPool) {
    let student = create_test_student(&pool).await;
    let instructor = create_test_instructor(&pool, "Owner").await;
    let course = create_test_course(&pool, instructor.id, "Old Title", "Misc").await;
    let app = setup_test_app(pool);
    let uri = format!("/api/courses/{course}");
    let update = json!({"title": "New Title", "description": "d", "courseUrl": "https://c.test"});

    let response = send(&app, "PUT", &uri, Some(&student.token), Some(update.clone())).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(&app, "PUT", &uri, Some(&instructor.token), Some(update)).await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["title"], "New Title");

    let response = send(&app, "DELETE", &uri, Some(&instructor.token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = send(&app, "GET", &uri, Some(&student.token), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
