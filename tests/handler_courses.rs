mod common;

use axum::http::StatusCode;
use common::{create_course, create_section, spawn_app};
use serde_json::{Value, json};

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let app = spawn_app().await;

    let response = app.server.get("/api/courses").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.header("www-authenticate"), "Bearer");
    assert_eq!(response.json::<Value>()["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn test_unknown_token_is_rejected() {
    let app = spawn_app().await;

    app.server
        .get("/api/courses")
        .authorization_bearer("not-a-real-token")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_staff_create_course_defaults_instructor() {
    let app = spawn_app().await;

    let course = create_course(
        &app,
        &app.staff,
        json!({ "title": "Rust 101", "enrollment_fee": 4900 }),
    )
    .await;

    assert_eq!(course["title"], "Rust 101");
    assert_eq!(course["status"], "draft");
    assert_eq!(course["enrollment_fee"], 4900);
    assert_eq!(course["instructor_id"], app.staff.profile.id);
}

#[tokio::test]
async fn test_create_course_validation() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/courses")
        .authorization_bearer(&app.staff.token)
        .json(&json!({ "title": "", "enrollment_fee": -5 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "validation_error");
    assert!(body["error"]["details"].get("title").is_some());
    assert!(body["error"]["details"].get("enrollment_fee").is_some());
}

#[tokio::test]
async fn test_students_cannot_create_courses() {
    let app = spawn_app().await;

    app.server
        .post("/api/courses")
        .authorization_bearer(&app.student.token)
        .json(&json!({ "title": "Nope" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_students_only_see_published_courses() {
    let app = spawn_app().await;

    let draft = create_course(&app, &app.staff, json!({ "title": "Draft" })).await;
    create_course(
        &app,
        &app.staff,
        json!({ "title": "Live", "status": "published" }),
    )
    .await;

    let list = app
        .server
        .get("/api/courses?status=draft")
        .authorization_bearer(&app.student.token)
        .await
        .json::<Value>();
    let titles: Vec<&str> = list["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Live"]);

    app.server
        .get(&format!("/api/courses/{}", draft["id"]))
        .authorization_bearer(&app.student.token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_reports_section_counts_and_filters_by_instructor() {
    let app = spawn_app().await;

    let mine = create_course(&app, &app.staff, json!({ "title": "Mine" })).await;
    create_course(&app, &app.other_staff, json!({ "title": "Theirs" })).await;
    let course_id = mine["id"].as_i64().unwrap();
    create_section(&app, &app.staff, course_id, "One").await;
    create_section(&app, &app.staff, course_id, "Two").await;

    let list = app
        .server
        .get(&format!(
            "/api/courses?instructor_id={}",
            app.staff.profile.id
        ))
        .authorization_bearer(&app.admin.token)
        .await
        .json::<Value>();

    let items = list["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Mine");
    assert_eq!(items[0]["section_count"], 2);
}

#[tokio::test]
async fn test_update_course_fields() {
    let app = spawn_app().await;

    let course = create_course(&app, &app.staff, json!({ "title": "Before" })).await;

    let response = app
        .server
        .patch(&format!("/api/courses/{}", course["id"]))
        .authorization_bearer(&app.staff.token)
        .json(&json!({ "title": "After", "status": "published", "instructor_id": null }))
        .await;

    response.assert_status_ok();
    let updated = response.json::<Value>();
    assert_eq!(updated["title"], "After");
    assert_eq!(updated["status"], "published");
    assert_eq!(updated["instructor_id"], Value::Null);
}

#[tokio::test]
async fn test_staff_cannot_modify_foreign_course() {
    let app = spawn_app().await;

    let course = create_course(&app, &app.staff, json!({ "title": "Mine" })).await;

    app.server
        .patch(&format!("/api/courses/{}", course["id"]))
        .authorization_bearer(&app.other_staff.token)
        .json(&json!({ "title": "Stolen" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    app.server
        .delete(&format!("/api/courses/{}", course["id"]))
        .authorization_bearer(&app.other_staff.token)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_delete_course_removes_its_tree() {
    let app = spawn_app().await;

    let course = create_course(&app, &app.staff, json!({ "title": "Doomed" })).await;
    let course_id = course["id"].as_i64().unwrap();
    let section = create_section(&app, &app.staff, course_id, "Week 1").await;

    app.server
        .delete(&format!("/api/courses/{course_id}"))
        .authorization_bearer(&app.admin.token)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.server
        .get(&format!("/api/courses/{course_id}"))
        .authorization_bearer(&app.admin.token)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    app.server
        .get(&format!("/api/sections/{}/content", section["id"]))
        .authorization_bearer(&app.admin.token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_course_is_not_found() {
    let app = spawn_app().await;

    let response = app
        .server
        .get("/api/courses/999999")
        .authorization_bearer(&app.admin.token)
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"]["code"], "not_found");
}
