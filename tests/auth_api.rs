//! Integration tests for login, token refresh and logout.

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{send, setup_test_app, ADMIN_EMAIL, ADMIN_PASSWORD};

async fn login_body(app: &axum::Router) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"].clone()
}

#[tokio::test]
async fn test_login_success() {
    let (app, _temp_db) = setup_test_app();

    let data = login_body(&app).await;

    assert!(data["accessToken"].as_str().is_some_and(|t| t.split('.').count() == 3));
    assert!(data["refreshToken"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(data["expiresIn"], 15 * 60);
    assert_eq!(data["user"]["email"], ADMIN_EMAIL);
    assert_eq!(data["user"]["role"], "admin");
    assert!(data["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_login_wrong_password() {
    let (app, _temp_db) = setup_test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": ADMIN_EMAIL, "password": "guess" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_login_unknown_user() {
    let (app, _temp_db) = setup_test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "intruder@example.com", "password": ADMIN_PASSWORD })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_me_returns_current_admin() {
    let (app, _temp_db) = setup_test_app();
    let token = login_body(&app).await["accessToken"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "GET", "/auth/me", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], ADMIN_EMAIL);
    assert_eq!(body["data"]["name"], "Test Admin");
}

#[tokio::test]
async fn test_refresh_rotates_token() {
    let (app, _temp_db) = setup_test_app();
    let refresh_token = login_body(&app).await["refreshToken"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        "/auth/refresh",
        None,
        Some(json!({ "refreshToken": refresh_token })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rotated = body["data"]["refreshToken"].as_str().unwrap();
    assert_ne!(rotated, refresh_token);

    let access = body["data"]["accessToken"].as_str().unwrap();
    let (status, _) = send(&app, "GET", "/auth/me", Some(access), None).await;
    assert_eq!(status, StatusCode::OK);

    // A refresh token works once.
    let (status, body) = send(
        &app,
        "POST",
        "/auth/refresh",
        None,
        Some(json!({ "refreshToken": refresh_token })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_logout_revokes_tokens() {
    let (app, _temp_db) = setup_test_app();
    let data = login_body(&app).await;
    let access = data["accessToken"].as_str().unwrap();
    let refresh_token = data["refreshToken"].as_str().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/auth/logout",
        Some(access),
        Some(json!({ "refreshToken": refresh_token })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = send(&app, "GET", "/admin/complaints", Some(access), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token has been revoked");

    let (status, _) = send(
        &app,
        "POST",
        "/auth/refresh",
        None,
        Some(json!({ "refreshToken": refresh_token })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_without_body() {
    let (app, _temp_db) = setup_test_app();
    let access = login_body(&app).await["accessToken"].as_str().unwrap().to_string();

    let (status, _) = send(&app, "POST", "/auth/logout", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/auth/me", Some(&access), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_requires_token() {
    let (app, _temp_db) = setup_test_app();

    let (status, body) = send(&app, "POST", "/auth/logout", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Missing Authorization header");
}
