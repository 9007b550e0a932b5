//! Shared helpers for the HTTP integration tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::FixedOffset;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::NamedTempFile;
use tower::ServiceExt;

use railcomplaint::auth::ensure_admin;
use railcomplaint::auth::jwt::JwtConfig;
use railcomplaint::config::{AdminSeed, Config};
use railcomplaint::database::{init_db, AppState};
use railcomplaint::route::create_app;

pub const ADMIN_EMAIL: &str = "admin@railmadad.test";
pub const ADMIN_PASSWORD: &str = "correct horse battery staple";

/// Creates a test application backed by a temporary database with one
/// administrator account. Days are counted in UTC.
pub fn setup_test_app() -> (Router, NamedTempFile) {
    setup_test_app_with(|_| {})
}

/// Like [`setup_test_app`], with a hook to adjust the configuration.
pub fn setup_test_app_with(adjust: impl FnOnce(&mut Config)) -> (Router, NamedTempFile) {
    let temp_db = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = temp_db.path().to_str().unwrap();
    let db = init_db(db_path).expect("Failed to initialize test database");

    ensure_admin(
        &db,
        &AdminSeed {
            email: ADMIN_EMAIL.to_string(),
            password: ADMIN_PASSWORD.to_string(),
            name: "Test Admin".to_string(),
        },
    )
    .expect("Failed to seed admin");

    let mut config = Config::new(JwtConfig {
        secret: "integration-test-secret".to_string(),
        access_token_expiry_mins: 15,
        refresh_token_expiry_days: 1,
    });
    config.timezone = FixedOffset::east_opt(0).unwrap();
    adjust(&mut config);

    (create_app(AppState::new(db, config)), temp_db)
}

/// Parses a response body as JSON.
pub async fn response_json(body: Body) -> Value {
    let bytes = body
        .collect()
        .await
        .expect("Failed to read response body")
        .to_bytes();

    serde_json::from_slice(&bytes).expect("Failed to parse JSON")
}

/// Sends a request and returns the status and JSON body.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
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
    (status, response_json(response.into_body()).await)
}

/// Logs in as the seeded administrator and returns the access token.
pub async fn login(app: &Router) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["data"]["accessToken"].as_str().unwrap().to_string()
}

/// Submits a complaint and returns the created record.
pub async fn submit_complaint(app: &Router, payload: Value) -> Value {
    let (status, body) = send(app, "POST", "/complaints", None, Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED, "submission failed: {body}");
    body["data"].clone()
}

pub fn complaint_payload(description: &str) -> Value {
    json!({
        "name": "Asha Rao",
        "email": "asha@example.com",
        "description": description,
        "category": "cleanliness",
        "trainNumber": "12951",
        "trainName": "Mumbai Rajdhani",
    })
}
