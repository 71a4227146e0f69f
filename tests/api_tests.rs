use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use lendtrack::config::Config;
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.security.jwt_secret = "test-secret".to_string();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config.observability.metrics_enabled = false;

    let state = lendtrack::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    lendtrack::api::router(state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);

    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, json)
}

async fn create_user(app: &Router, username: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/users/",
        Some(json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "correct-horse",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"]["id"].as_i64().unwrap()
}

async fn create_item(app: &Router, name: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/items/",
        Some(json!({ "name": name, "type": "Laptop" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = spawn_app().await;

    let (status, body) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["database"], true);
}

#[tokio::test]
async fn test_created_user_is_listed_and_retrievable() {
    let app = spawn_app().await;
    let id = create_user(&app, "alice").await;

    let (status, body) = send(&app, "GET", "/users/", None).await;
    assert_eq!(status, StatusCode::OK);
    let users = body["data"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["username"], "alice");
    assert_eq!(users[0]["role"], "user");
    assert!(users[0].get("password").is_none());
    assert!(users[0].get("password_hash").is_none());

    let (status, body) = send(&app, "GET", &format!("/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "alice@example.com");
}

#[tokio::test]
async fn test_duplicate_username_is_rejected_without_partial_row() {
    let app = spawn_app().await;
    create_user(&app, "alice").await;

    let (status, body) = send(
        &app,
        "POST",
        "/users/",
        Some(json!({
            "username": "alice",
            "email": "other@example.com",
            "password": "correct-horse",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Username or email already registered");

    let (_, body) = send(&app, "GET", "/users/", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_user_input_is_validated() {
    let app = spawn_app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/users/",
        Some(json!({ "username": "bob", "email": "bob@example.com", "password": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/users/",
        Some(json!({ "username": "bob", "email": "not-an-email", "password": "correct-horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/users/",
        Some(json!({
            "username": "bob",
            "email": "bob@example.com",
            "password": "correct-horse",
            "role": "superuser",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_role() {
    let app = spawn_app().await;
    let id = create_user(&app, "carol").await;

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/users/{id}/role"),
        Some(json!({ "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "admin");

    let (status, _) = send(
        &app,
        "PATCH",
        "/users/999/role",
        Some(json!({ "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_item_defaults() {
    let app = spawn_app().await;
    let id = create_item(&app, "ThinkPad").await;

    let (status, body) = send(&app, "GET", &format!("/items/{id}/"), None).await;
    assert_eq!(status, StatusCode::OK);

    let item = &body["data"];
    assert_eq!(item["name"], "ThinkPad");
    assert_eq!(item["type"], "Laptop");
    assert_eq!(item["serial_number"], "0000");
    assert_eq!(item["condition"], "New");
    assert_eq!(item["status"], "Available");
    assert_eq!(item["location"], "School");
    assert_eq!(item["photo_url"], "/");
}

#[tokio::test]
async fn test_item_with_unknown_status_is_rejected() {
    let app = spawn_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/items/",
        Some(json!({ "name": "Camera", "type": "Camera", "status": "Lost" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Lost"));

    let (_, body) = send(&app, "GET", "/items/", None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_item_patch_without_recognized_fields_is_rejected() {
    let app = spawn_app().await;
    let id = create_item(&app, "Projector").await;

    for payload in [json!({}), json!({ "color": "red", "id": 50 })] {
        let (status, body) = send(&app, "PATCH", &format!("/items/{id}/"), Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No valid fields provided for update");
    }
}

#[tokio::test]
async fn test_item_patch_updates_only_given_fields() {
    let app = spawn_app().await;
    let id = create_item(&app, "Projector").await;

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/items/{id}/"),
        Some(json!({ "location": "Room 101", "status": "under repair" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let item = &body["data"];
    assert_eq!(item["location"], "Room 101");
    assert_eq!(item["status"], "Under Repair");
    assert_eq!(item["name"], "Projector");
    assert_eq!(item["type"], "Laptop");
    assert_eq!(item["condition"], "New");
}

#[tokio::test]
async fn test_missing_ids_return_not_found() {
    let app = spawn_app().await;

    let (status, body) = send(&app, "GET", "/items/42/", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Item 42 not found");

    let (status, _) = send(
        &app,
        "PATCH",
        "/items/42/",
        Some(json!({ "name": "Ghost" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/items/42/", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "DELETE", "/requests/7/", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Request 7 not found");

    let (status, _) = send(&app, "DELETE", "/users/3", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleted_item_disappears_from_list() {
    let app = spawn_app().await;
    let keep = create_item(&app, "Tripod").await;
    let gone = create_item(&app, "Microphone").await;

    let (status, _) = send(&app, "DELETE", &format!("/items/{gone}/"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/items/", None).await;
    let ids: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![keep]);
}

#[tokio::test]
async fn test_request_defaults_to_pending() {
    let app = spawn_app().await;
    let user_id = create_user(&app, "dave").await;
    let item_id = create_item(&app, "Tablet").await;

    let (status, body) = send(
        &app,
        "POST",
        "/requests/",
        Some(json!({ "user_id": user_id, "item_id": item_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let request = &body["data"];
    assert_eq!(request["status"], "Pending");
    assert!(request["requested_at"].is_string());
    assert!(request["reviewed_at"].is_null());
}

#[tokio::test]
async fn test_request_must_reference_existing_rows() {
    let app = spawn_app().await;
    let item_id = create_item(&app, "Tablet").await;

    let (status, body) = send(
        &app,
        "POST",
        "/requests/",
        Some(json!({ "user_id": 99, "item_id": item_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User 99 does not exist");

    let (_, body) = send(&app, "GET", "/requests/", None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_approving_request_checks_item_out() {
    let app = spawn_app().await;
    let user_id = create_user(&app, "erin").await;
    let item_id = create_item(&app, "Camera").await;

    let (_, body) = send(
        &app,
        "POST",
        "/requests/",
        Some(json!({ "user_id": user_id, "item_id": item_id })),
    )
    .await;
    let request_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/requests/{request_id}/"),
        Some(json!({ "status": "Approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "Approved");
    assert!(body["data"]["reviewed_at"].is_string());

    let (_, body) = send(&app, "GET", &format!("/items/{item_id}/"), None).await;
    assert_eq!(body["data"]["status"], "Checked Out");
}

#[tokio::test]
async fn test_request_created_as_approved_checks_item_out() {
    let app = spawn_app().await;
    let user_id = create_user(&app, "frank").await;
    let item_id = create_item(&app, "Drone").await;

    let (status, _) = send(
        &app,
        "POST",
        "/requests/",
        Some(json!({ "user_id": user_id, "item_id": item_id, "status": "Approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", &format!("/items/{item_id}/"), None).await;
    assert_eq!(body["data"]["status"], "Checked Out");
}

#[tokio::test]
async fn test_denying_request_leaves_item_available() {
    let app = spawn_app().await;
    let user_id = create_user(&app, "grace").await;
    let item_id = create_item(&app, "Speaker").await;

    let (_, body) = send(
        &app,
        "POST",
        "/requests/",
        Some(json!({ "user_id": user_id, "item_id": item_id })),
    )
    .await;
    let request_id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/requests/{request_id}/"),
        Some(json!({ "status": "Denied" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", &format!("/items/{item_id}/"), None).await;
    assert_eq!(body["data"]["status"], "Available");
}

#[tokio::test]
async fn test_request_patch_validation() {
    let app = spawn_app().await;
    let user_id = create_user(&app, "heidi").await;
    let item_id = create_item(&app, "Monitor").await;

    let (_, body) = send(
        &app,
        "POST",
        "/requests/",
        Some(json!({ "user_id": user_id, "item_id": item_id })),
    )
    .await;
    let request_id = body["data"]["id"].as_i64().unwrap();
    let uri = format!("/requests/{request_id}/");

    let (status, _) = send(&app, "PATCH", &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "PATCH", &uri, Some(json!({ "status": "Maybe" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "PATCH", &uri, Some(json!({ "item_id": 999 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(body["data"]["status"], "Pending");
    assert_eq!(body["data"]["item_id"], item_id);
}

#[tokio::test]
async fn test_deleting_user_removes_their_requests() {
    let app = spawn_app().await;
    let user_id = create_user(&app, "ivan").await;
    let item_id = create_item(&app, "Scanner").await;

    send(
        &app,
        "POST",
        "/requests/",
        Some(json!({ "user_id": user_id, "item_id": item_id })),
    )
    .await;

    let (status, _) = send(&app, "DELETE", &format!("/users/{user_id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/requests/", None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_non_positive_ids_are_not_found() {
    let app = spawn_app().await;

    let (status, body) = send(&app, "GET", "/items/0/", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Item 0 not found");

    let (status, _) = send(&app, "GET", "/users/-4", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "DELETE", "/users/0", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User 0 not found");

    let (status, body) = send(
        &app,
        "POST",
        "/requests/",
        Some(json!({ "user_id": 0, "item_id": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User 0 does not exist");
}

#[tokio::test]
async fn test_malformed_body_uses_error_envelope() {
    let app = spawn_app().await;

    let (status, body) = send(&app, "POST", "/items/", Some(json!({ "name": "Laptop" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("missing field `type`"));

    let user_id = create_user(&app, "trent").await;
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/users/{user_id}/role"),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = send(
        &app,
        "POST",
        "/requests/",
        Some(json!({ "user_id": "one", "item_id": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let request = Request::builder()
        .method("POST")
        .uri("/items/")
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_non_numeric_id_uses_error_envelope() {
    let app = spawn_app().await;

    let (status, body) = send(&app, "GET", "/items/abc/", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("abc"));

    let (status, body) = send(&app, "DELETE", "/requests/xyz/", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

async fn get_text(app: &Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_metrics_renders_recorded_series() {
    let recorder = PrometheusBuilder::new().build_recorder();
    metrics::with_local_recorder(&recorder, || {
        metrics::counter!("lendtrack_checkouts_total").increment(3);
    });

    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.security.jwt_secret = "test-secret".to_string();
    let state = lendtrack::api::create_app_state_from_config(config, Some(recorder.handle()))
        .await
        .unwrap();
    let app = lendtrack::api::router(state);

    let (status, body) = get_text(&app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("lendtrack_checkouts_total 3"), "{body}");
}

#[tokio::test]
async fn test_metrics_disabled_is_not_found() {
    let app = spawn_app().await;

    let (status, body) = get_text(&app, "/metrics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Metrics are disabled"));
}
