//! Error types for the complaint service
//!
//! Three layers:
//! - [`DomainError`] is raised by the pure modules (lifecycle, parsing, validation)
//! - [`StoreError`] is raised by the redb repository layer
//! - [`AppError`] wraps both for HTTP handlers and renders the JSON envelope

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::model::Status;

/// Errors produced by complaint domain rules.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// A required field is missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// A value outside a closed enumeration was supplied for a mutable field.
    #[error("Invalid value '{value}' for {field}")]
    InvalidEnumValue { field: &'static str, value: String },

    /// The requested status change is not permitted from the current status.
    #[error("Cannot move complaint from {from} to {to}")]
    InvalidTransition { from: Status, to: Status },

    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        DomainError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::Validation(errors.to_string())
    }
}

/// Errors raised while reading or writing the embedded database.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("corrupt record: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Application-level error type for HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Missing, malformed, expired or revoked credentials.
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Domain(errors.into())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Domain(DomainError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Domain(DomainError::Validation(rejection.body_text()))
    }
}

impl AppError {
    /// HTTP status, machine-readable code and client-facing message.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Domain(domain) => match domain {
                DomainError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                DomainError::InvalidEnumValue { .. } => (
                    StatusCode::BAD_REQUEST,
                    "INVALID_ENUM_VALUE",
                    domain.to_string(),
                ),
                DomainError::InvalidTransition { .. } => (
                    StatusCode::CONFLICT,
                    "INVALID_TRANSITION",
                    domain.to_string(),
                ),
                DomainError::NotFound { .. } => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", domain.to_string())
                }
            },
            AppError::Store(err) => {
                tracing::error!(error = %err, "Storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = json!({
            "success": false,
            "message": message,
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}
