use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::jwt::validate_token;
use crate::database::AppState;
use crate::error::AppError;
use crate::repository::RevokedTokenRepo;

/// Authenticated admin, inserted into request extensions by [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
    pub name: String,
    pub role: String,
    /// Identifier of the access token used for this request.
    pub token_id: String,
    /// Expiry of that token (Unix timestamp).
    pub token_expires_at: i64,
}

/// Middleware guarding admin routes with a bearer token
///
/// Requires `Authorization: Bearer <token>` carrying a valid, unexpired,
/// unrevoked access token. Rejects with 401 otherwise.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?;

    let claims = validate_token(token, &state.config.jwt)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

    if RevokedTokenRepo::is_revoked(&state.db, &claims.jti)? {
        return Err(AppError::Unauthorized("Token has been revoked".into()));
    }

    request.extensions_mut().insert(AuthUser {
        email: claims.sub,
        name: claims.name,
        role: claims.role,
        token_id: claims.jti,
        token_expires_at: claims.exp,
    });

    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            AppError::Unauthorized("Invalid Authorization format. Expected: Bearer <token>".into())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn rejects_missing_or_malformed_header() {
        let headers = HeaderMap::new();
        assert!(matches!(bearer_token(&headers), Err(AppError::Unauthorized(_))));

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Token abc"));
        assert!(matches!(bearer_token(&headers), Err(AppError::Unauthorized(_))));

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(matches!(bearer_token(&headers), Err(AppError::Unauthorized(_))));
    }
}
