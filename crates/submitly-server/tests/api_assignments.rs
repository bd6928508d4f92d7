use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use submitly_db::{create_pool, run_migrations, DbSettings};
use submitly_server::{app, AppState};
use tower::ServiceExt;

// The temp file must outlive the test: dropping it deletes the database
// shared by the pooled connections.
fn setup_app() -> (axum::Router, submitly_db::DbPool, tempfile::NamedTempFile) {
    let file = tempfile::NamedTempFile::new().expect("failed to create temp db file");
    let path = file.path().to_str().expect("temp path should be utf-8");

    let pool = create_pool(path, DbSettings::default()).expect("failed to create pool");
    {
        let conn = pool.get().expect("failed to get connection");
        run_migrations(&conn).expect("failed to run migrations");
    }

    (app(AppState { pool: pool.clone() }), pool, file)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

fn patch_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("PATCH")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// Seeds a user and a subject; returns (user_id, subject_id).
async fn seed_owner_and_subject(app: &axum::Router) -> (String, String) {
    let response = app
        .clone()
        .oneshot(post_json(
            "/users",
            &json!({"email": "student@example.com", "name": "Student"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let user_id = json_body(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(post_json(
            "/subjects",
            &json!({"userId": user_id, "name": "History"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let subject_id = json_body(response).await["id"].as_str().unwrap().to_string();

    (user_id, subject_id)
}

#[tokio::test]
async fn create_assignment_returns_record_with_defaults() {
    let (app, _pool, _guard) = setup_app();
    let (user_id, subject_id) = seed_owner_and_subject(&app).await;

    let response = app
        .oneshot(post_json(
            "/assignments",
            &json!({
                "title": "Essay",
                "dueDate": "2026-09-15T12:00:00Z",
                "userId": user_id,
                "subjectId": subject_id,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let assignment = json_body(response).await;
    assert_eq!(assignment["title"], "Essay");
    assert_eq!(assignment["description"], Value::Null);
    assert_eq!(assignment["dueDate"], "2026-09-15T12:00:00.000Z");
    assert_eq!(assignment["status"], "pending");
    assert_eq!(assignment["userId"], user_id);
    assert_eq!(assignment["subjectId"], subject_id);
}

#[tokio::test]
async fn list_assignments_due_date_ascending_with_subject() {
    let (app, _pool, _guard) = setup_app();
    let (user_id, subject_id) = seed_owner_and_subject(&app).await;

    // Created deliberately out of due-date order.
    for (title, due) in [
        ("D2", "2026-09-02"),
        ("D3", "2026-09-03"),
        ("D1", "2026-09-01"),
    ] {
        let response = app
            .clone()
            .oneshot(post_json(
                "/assignments",
                &json!({
                    "title": title,
                    "dueDate": due,
                    "userId": user_id,
                    "subjectId": subject_id,
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/assignments?userId={user_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let listed = json_body(response).await;
    let items = listed.as_array().expect("body should be an array");
    let titles: Vec<&str> = items.iter().map(|a| a["title"].as_str().unwrap()).collect();
    assert_eq!(titles, ["D1", "D2", "D3"]);

    for item in items {
        assert_eq!(item["subject"]["id"], subject_id);
        assert_eq!(item["subject"]["name"], "History");
        assert_eq!(item["subject"]["userId"], user_id);
    }
}

#[tokio::test]
async fn update_status_overwrites_and_returns_record() {
    let (app, _pool, _guard) = setup_app();
    let (user_id, subject_id) = seed_owner_and_subject(&app).await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/assignments",
            &json!({
                "title": "Quiz",
                "dueDate": "2026-09-10",
                "userId": user_id,
                "subjectId": subject_id,
            }),
        ))
        .await
        .unwrap();
    let created = json_body(response).await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(patch_json(
            &format!("/assignments/{id}/status"),
            &json!({"status": "submitted"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = json_body(response).await;
    assert_eq!(updated["status"], "submitted");
    // Everything but status is untouched.
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["title"], created["title"]);
    assert_eq!(updated["dueDate"], created["dueDate"]);
    assert_eq!(updated["createdAt"], created["createdAt"]);

    // A second overwrite wins; no history is kept.
    let response = app
        .oneshot(patch_json(
            &format!("/assignments/{id}/status"),
            &json!({"status": "graded"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "graded");
}

#[tokio::test]
async fn update_status_unknown_id_is_404() {
    let (app, _pool, _guard) = setup_app();

    let response = app
        .oneshot(patch_json(
            "/assignments/no-such-id/status",
            &json!({"status": "submitted"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unparseable_due_date_is_400_and_writes_nothing() {
    let (app, pool, _guard) = setup_app();
    let (user_id, subject_id) = seed_owner_and_subject(&app).await;

    let response = app
        .oneshot(post_json(
            "/assignments",
            &json!({
                "title": "Broken",
                "dueDate": "next tuesday",
                "userId": user_id,
                "subjectId": subject_id,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let conn = pool.get().unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM assignments", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0, "no record may be created on parse failure");
}

#[tokio::test]
async fn create_assignment_with_unknown_subject_conflicts() {
    let (app, _pool, _guard) = setup_app();
    let (user_id, _) = seed_owner_and_subject(&app).await;

    let response = app
        .oneshot(post_json(
            "/assignments",
            &json!({
                "title": "Orphan",
                "dueDate": "2026-09-01",
                "userId": user_id,
                "subjectId": "no-such-subject",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
