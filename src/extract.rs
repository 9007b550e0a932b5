//! Request extractors that reject with the JSON error envelope.
//!
//! Axum's own `Json` and `Query` answer a malformed body or query string with
//! a plain-text 4xx. These wrappers route the rejection through [`AppError`]
//! instead.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// URL query string.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);
