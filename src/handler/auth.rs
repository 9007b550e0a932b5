//! Handlers for the `/auth` resource (login, refresh, logout, me).

use axum::{body::Bytes, extract::State, Extension, Json};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::verify_password;
use crate::auth::{AdminUser, Session};
use crate::database::AppState;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::AuthUser;
use crate::model::ApiResponse;
use crate::repository::{RevokedTokenRepo, SessionRepo, UserRepo};

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

/// Returned by login and refresh.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub email: String,
    pub name: String,
    pub role: String,
}

impl From<&AdminUser> for UserInfo {
    fn from(user: &AdminUser) -> Self {
        UserInfo {
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    let invalid = || AppError::Unauthorized("Invalid email or password".into());

    let user = UserRepo::find_by_email(&state.db, &input.email)?.ok_or_else(invalid)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::Internal(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::warn!(email = %user.email, "Failed admin login");
        return Err(invalid());
    }

    let response = issue_tokens(&state, &user)?;
    tracing::info!(email = %user.email, "Admin logged in");

    Ok(Json(ApiResponse::ok(response)))
}

/// `POST /auth/refresh`
///
/// Exchanges a refresh token for a new token pair. The old refresh token is
/// consumed.
pub async fn refresh(
    State(state): State<AppState>,
    AppJson(input): AppJson<RefreshRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    let invalid = || AppError::Unauthorized("Invalid or expired refresh token".into());

    let session = SessionRepo::take(&state.db, &hash_refresh_token(&input.refresh_token))?
        .ok_or_else(invalid)?;
    if session.expires_at <= Utc::now() {
        return Err(invalid());
    }

    let user = UserRepo::find_by_email(&state.db, &session.email)?.ok_or_else(invalid)?;
    let response = issue_tokens(&state, &user)?;

    Ok(Json(ApiResponse::ok(response)))
}

/// `POST /auth/logout`
///
/// Revokes the access token used for the request and, when the body carries
/// one, the refresh token.
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<()>>> {
    let request: LogoutRequest = if body.is_empty() {
        LogoutRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid logout body: {e}")))?
    };

    RevokedTokenRepo::revoke(&state.db, &user.token_id, user.token_expires_at)?;
    if let Some(refresh_token) = request.refresh_token {
        SessionRepo::take(&state.db, &hash_refresh_token(&refresh_token))?;
    }

    tracing::info!(email = %user.email, "Admin logged out");

    Ok(Json(ApiResponse {
        success: true,
        data: None,
        message: Some("Logged out".to_string()),
    }))
}

/// `GET /auth/me`
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<ApiResponse<UserInfo>>> {
    let account = UserRepo::find_by_email(&state.db, &user.email)?
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".into()))?;

    Ok(Json(ApiResponse::ok(UserInfo::from(&account))))
}

fn issue_tokens(state: &AppState, user: &AdminUser) -> AppResult<AuthResponse> {
    let jwt = &state.config.jwt;

    let access_token = generate_access_token(&user.email, &user.name, &user.role, jwt)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {e}")))?;

    let (refresh_token, refresh_hash) = generate_refresh_token();
    let now = Utc::now();
    SessionRepo::insert(
        &state.db,
        &refresh_hash,
        &Session {
            email: user.email.clone(),
            created_at: now,
            expires_at: now + Duration::days(jwt.refresh_token_expiry_days),
        },
    )?;

    Ok(AuthResponse {
        access_token,
        refresh_token,
        expires_in: jwt.access_token_expiry_secs(),
        user: UserInfo::from(user),
    })
}
