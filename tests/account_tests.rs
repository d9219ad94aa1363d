//! Integration tests for signup, login, edit-user and delete-user.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use parking_alert::api::AppState;
use parking_alert::config::Config;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

/// Temp SQLite file removed when the test ends.
struct TestDb(PathBuf);

impl TestDb {
    fn new() -> Self {
        Self(std::env::temp_dir().join(format!(
            "parking-alert-accounts-test-{}.db",
            uuid::Uuid::new_v4()
        )))
    }

    fn url(&self) -> String {
        format!("sqlite:{}", self.0.display())
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm", "-journal"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", self.0.display()));
        }
    }
}

async fn spawn_app() -> (Arc<AppState>, Router, TestDb) {
    let db = TestDb::new();

    let mut config = Config::default();
    config.general.database_path = db.url();
    config.observability.metrics_enabled = false;
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;

    let state = parking_alert::api::create_app_state_from_config(config, None)
        .await
        .expect("failed to create app state");
    let router = parking_alert::api::router(state.clone());
    (state, router, db)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn bob() -> Value {
    json!({
        "username": "bob",
        "password": "longpass1",
        "name": "Bob",
        "surname": "Lee",
        "email": "bob@x.com"
    })
}

async fn signup(app: &Router, username: &str, email: &str) -> i32 {
    let (status, body) = send(
        app,
        "POST",
        "/api/signup/",
        Some(json!({
            "username": username,
            "password": "longpass1",
            "name": "Test",
            "surname": "User",
            "email": email
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
    i32::try_from(body["user_id"].as_i64().unwrap()).unwrap()
}

// ============================================================================
// Signup
// ============================================================================

#[tokio::test]
async fn test_signup_returns_created_user_id() {
    let (state, app, _db) = spawn_app().await;

    let (status, body) = send(&app, "POST", "/api/signup/", Some(bob())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "success");
    let user_id = i32::try_from(body["user_id"].as_i64().unwrap()).unwrap();

    let user = state.store().get_user(user_id).await.unwrap().unwrap();
    assert_eq!(user.username, "bob");
    assert_eq!(user.email, "bob@x.com");
    assert_eq!(user.role_id, 2);
    assert_eq!(user.bio, "");
}

#[tokio::test]
async fn test_signup_stores_optional_fields() {
    let (state, app, _db) = spawn_app().await;

    let mut payload = bob();
    payload["bio"] = json!("Parks near Tivoli");
    payload["phone"] = json!("+386 1 234 5678");

    let (status, body) = send(&app, "POST", "/api/signup/", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);

    let user_id = i32::try_from(body["user_id"].as_i64().unwrap()).unwrap();
    let user = state.store().get_user(user_id).await.unwrap().unwrap();
    assert_eq!(user.bio, "Parks near Tivoli");
    assert_eq!(user.phone, "+386 1 234 5678");
}

#[tokio::test]
async fn test_duplicate_signup_conflicts() {
    let (_, app, _db) = spawn_app().await;

    let (status, _) = send(&app, "POST", "/api/signup/", Some(bob())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "POST", "/api/signup/", Some(bob())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Username already exists");

    let mut same_email = bob();
    same_email["username"] = json!("robert");
    let (status, body) = send(&app, "POST", "/api/signup/", Some(same_email)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email already exists");
}

#[tokio::test]
async fn test_short_password_is_rejected_even_for_taken_username() {
    let (_, app, _db) = spawn_app().await;

    let mut short = bob();
    short["password"] = json!("short");
    let (status, _) = send(&app, "POST", "/api/signup/", Some(short.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "POST", "/api/signup/", Some(bob())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(&app, "POST", "/api/signup/", Some(short)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut seven = bob();
    seven["username"] = json!("seven");
    seven["email"] = json!("seven@x.com");
    seven["password"] = json!("1234567");
    let (status, _) = send(&app, "POST", "/api/signup/", Some(seven)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_signup_requires_fields() {
    let (_, app, _db) = spawn_app().await;

    for field in ["username", "password", "name", "surname", "email"] {
        let mut payload = bob();
        payload.as_object_mut().unwrap().remove(field);
        let (status, body) = send(&app, "POST", "/api/signup/", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "missing {field}");
        assert_eq!(body["message"], format!("{field} is required"));
    }

    let (status, _) = send(&app, "POST", "/api/signup/", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_signup_rejects_malformed_json() {
    let (_, app, _db) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/signup/")
                .header("Content-Type", "application/json")
                .body(Body::from("{\"username\": "))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_signup_without_default_role_is_server_error() {
    let (state, app, _db) = spawn_app().await;
    assert!(state.store().remove_role(2).await.unwrap());

    let (status, body) = send(&app, "POST", "/api/signup/", Some(bob())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "An internal error occurred");
    assert!(state.store().list_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_signup_avatar_is_optional() {
    let (state, app, _db) = spawn_app().await;

    let user_id = signup(&app, "noavatar", "noavatar@x.com").await;
    let user = state.store().get_user(user_id).await.unwrap().unwrap();
    assert_eq!(user.image_id, None);
}

#[tokio::test]
async fn test_signup_assigns_avatar_from_pool() {
    let (state, app, _db) = spawn_app().await;
    for i in 1..=10 {
        state
            .store()
            .add_image(&format!("https://img.example/avatar-{i}.png"))
            .await
            .unwrap();
    }

    for i in 0..5 {
        let user_id = signup(&app, &format!("user{i}"), &format!("user{i}@x.com")).await;
        let user = state.store().get_user(user_id).await.unwrap().unwrap();
        let image_id = user.image_id.expect("avatar should be assigned");
        assert!((1..=10).contains(&image_id));
    }
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_success() {
    let (_, app, _db) = spawn_app().await;
    let user_id = signup(&app, "bob", "bob@x.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/login/",
        Some(json!({"email": "bob@x.com", "password": "longpass1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], user_id);
    assert_eq!(body["username"], "bob");
    assert_eq!(body["email"], "bob@x.com");
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_login_failure_does_not_reveal_which_field_was_wrong() {
    let (_, app, _db) = spawn_app().await;
    signup(&app, "bob", "bob@x.com").await;

    let (wrong_password_status, wrong_password) = send(
        &app,
        "POST",
        "/api/login/",
        Some(json!({"email": "bob@x.com", "password": "wrongpass"})),
    )
    .await;
    let (unknown_email_status, unknown_email) = send(
        &app,
        "POST",
        "/api/login/",
        Some(json!({"email": "nobody@x.com", "password": "longpass1"})),
    )
    .await;

    assert_eq!(wrong_password_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password["message"], unknown_email["message"]);
}

#[tokio::test]
async fn test_login_requires_email_and_password() {
    let (_, app, _db) = spawn_app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/login/",
        Some(json!({"email": "bob@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/login/",
        Some(json!({"password": "longpass1"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Edit user
// ============================================================================

#[tokio::test]
async fn test_get_user_profile() {
    let (_, app, _db) = spawn_app().await;
    let user_id = signup(&app, "bob", "bob@x.com").await;

    let (status, body) = send(&app, "GET", &format!("/api/edit-user/?user_id={user_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], user_id);
    assert_eq!(body["user"]["username"], "bob");
    assert_eq!(body["user"]["surname"], "User");
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("role_id").is_none());
}

#[tokio::test]
async fn test_get_user_errors() {
    let (_, app, _db) = spawn_app().await;

    let (status, _) = send(&app, "GET", "/api/edit-user/", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/api/edit-user/?user_id=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "GET", "/api/edit-user/?user_id=999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_edit_user_updates_whitelisted_fields_only() {
    let (state, app, _db) = spawn_app().await;
    let user_id = signup(&app, "bob", "bob@x.com").await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/edit-user/?user_id={user_id}"),
        Some(json!({
            "bio": "Commutes to Maribor",
            "location": "Ljubljana",
            "role": 1,
            "role_id": 1,
            "password": "hijacked1",
            "id": 42
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["bio"], "Commutes to Maribor");
    assert_eq!(body["user"]["location"], "Ljubljana");
    assert_eq!(body["user"]["id"], user_id);

    let user = state.store().get_user(user_id).await.unwrap().unwrap();
    assert_eq!(user.role_id, 2);
    assert_eq!(user.username, "bob");

    let (status, _) = send(
        &app,
        "POST",
        "/api/login/",
        Some(json!({"email": "bob@x.com", "password": "longpass1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_edit_user_rejects_taken_username() {
    let (_, app, _db) = spawn_app().await;
    signup(&app, "alice", "alice@x.com").await;
    let bob_id = signup(&app, "bob", "bob@x.com").await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/edit-user/?user_id={bob_id}"),
        Some(json!({"username": "alice"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Username already exists");

    // Keeping one's own username is not a conflict.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/edit-user/?user_id={bob_id}"),
        Some(json!({"username": "bob", "email": "bob@x.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_edit_unknown_user_is_not_found() {
    let (_, app, _db) = spawn_app().await;

    let (status, _) = send(
        &app,
        "PUT",
        "/api/edit-user/?user_id=77",
        Some(json!({"bio": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Delete user
// ============================================================================

#[tokio::test]
async fn test_self_delete_is_allowed() {
    let (state, app, _db) = spawn_app().await;
    let user_id = signup(&app, "bob", "bob@x.com").await;

    let (status, body) = send(
        &app,
        "DELETE",
        "/api/delete-user/",
        Some(json!({"requester_id": user_id, "target_user_id": user_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert!(state.store().get_user(user_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_non_admin_cannot_delete_others() {
    let (state, app, _db) = spawn_app().await;
    let alice = signup(&app, "alice", "alice@x.com").await;
    let bob = signup(&app, "bob", "bob@x.com").await;

    let (status, _) = send(
        &app,
        "DELETE",
        "/api/delete-user/",
        Some(json!({"requester_id": bob, "target_user_id": alice})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(state.store().get_user(alice).await.unwrap().is_some());
}

#[tokio::test]
async fn test_admin_can_delete_others() {
    let (state, app, _db) = spawn_app().await;
    let admin = signup(&app, "admin", "admin@x.com").await;
    let bob = signup(&app, "bob", "bob@x.com").await;
    assert!(state.store().set_user_role(admin, 1).await.unwrap());

    let (status, _) = send(
        &app,
        "DELETE",
        "/api/delete-user/",
        Some(json!({"requester_id": admin, "target_user_id": bob})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(state.store().get_user(bob).await.unwrap().is_none());
    assert!(state.store().get_user(admin).await.unwrap().is_some());
}

#[tokio::test]
async fn test_delete_user_error_statuses() {
    let (_, app, _db) = spawn_app().await;
    let bob = signup(&app, "bob", "bob@x.com").await;

    let (status, _) = send(
        &app,
        "DELETE",
        "/api/delete-user/",
        Some(json!({"requester_id": bob})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "DELETE",
        "/api/delete-user/",
        Some(json!({"requester_id": 999, "target_user_id": bob})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "DELETE",
        "/api/delete-user/",
        Some(json!({"requester_id": bob, "target_user_id": 999})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_user_removes_user_data() {
    let (state, app, _db) = spawn_app().await;
    let bob = signup(&app, "bob", "bob@x.com").await;
    state
        .store()
        .add_user_data(bob, "Reported a blocked spot")
        .await
        .unwrap();
    assert_eq!(state.store().list_user_data(bob).await.unwrap().len(), 1);

    let (status, _) = send(
        &app,
        "DELETE",
        "/api/delete-user/",
        Some(json!({"requester_id": bob, "target_user_id": bob})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(state.store().list_user_data(bob).await.unwrap().is_empty());
}

// ============================================================================
// Diagnostics
// ============================================================================

#[tokio::test]
async fn test_diagnostic_endpoint() {
    let (_, app, _db) = spawn_app().await;
    signup(&app, "bob", "bob@x.com").await;

    let (status, body) = send(&app, "GET", "/api/test/", None).await;
    assert_eq!(status, StatusCode::OK);
    let users = body["data"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["username"], "bob");
    assert!(users[0].get("password").is_none());

    let (status, body) = send(&app, "POST", "/api/test/", Some(json!({"ping": 1}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["data"]["ping"], 1);
}

// ============================================================================
// Concurrency
// ============================================================================

fn signup_body(username: &str, email: &str) -> Value {
    json!({
        "username": username,
        "password": "longpass1",
        "name": "Test",
        "surname": "User",
        "email": email
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_signups_of_distinct_users_all_succeed() {
    let (state, app, _db) = spawn_app().await;

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let app = app.clone();
            tokio::spawn(async move {
                let body = signup_body(&format!("user{i}"), &format!("user{i}@x.com"));
                send(&app, "POST", "/api/signup/", Some(body)).await
            })
        })
        .collect();

    for handle in handles {
        let (status, body) = handle.await.unwrap();
        assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
    }

    assert_eq!(state.store().list_users().await.unwrap().len(), 16);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_identical_signups_create_one_user() {
    let (state, app, _db) = spawn_app().await;

    let handles: Vec<_> = (0..12)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move { send(&app, "POST", "/api/signup/", Some(bob())).await })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        let (status, body) = handle.await.unwrap();
        match status {
            StatusCode::CREATED => created += 1,
            StatusCode::CONFLICT => assert!(
                body["message"] == "Username already exists"
                    || body["message"] == "Email already exists",
                "unexpected conflict: {body}"
            ),
            other => panic!("unexpected status {other}: {body}"),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(state.store().list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_seeded_roles() {
    let (state, _app, _db) = spawn_app().await;

    let roles: Vec<(i32, String)> = state
        .store()
        .list_roles()
        .await
        .unwrap()
        .into_iter()
        .map(|role| (role.id, role.name))
        .collect();
    assert_eq!(
        roles,
        [(1, "admin".to_string()), (2, "default".to_string())]
    );
}
