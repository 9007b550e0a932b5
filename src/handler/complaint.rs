//! Public complaint endpoints: submission and tracking.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::database::AppState;
use crate::error::{AppError, AppResult, DomainError};
use crate::extract::AppJson;
use crate::model::{ApiResponse, Complaint, ComplaintView, CreateComplaintRequest, NewComplaint};
use crate::repository::ComplaintRepo;

/// Validates and stores a new complaint. Shared with the chatbot endpoint.
pub(crate) fn submit(state: &AppState, request: CreateComplaintRequest) -> AppResult<Complaint> {
    let input = NewComplaint::try_from(request)?;
    let complaint = ComplaintRepo::create(
        &state.db,
        input,
        &state.config.complaint_code_prefix,
        &state.config.timezone,
        Utc::now(),
    )?;

    tracing::info!(
        complaint_id = %complaint.complaint_id,
        category = complaint.category.as_ref().map(|c| c.as_str()).unwrap_or("none"),
        priority = complaint.priority.as_str(),
        "Complaint submitted"
    );

    Ok(complaint)
}

/// Creates a new complaint
///
/// `POST /complaints`
///
/// # Response
///
/// - **201 Created** - `{success: true, data: Complaint}`
/// - **400 Bad Request** - missing description, malformed email, ...
pub async fn create_complaint(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateComplaintRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ComplaintView>>)> {
    let complaint = submit(&state, payload)?;
    let message = format!("Complaint registered with reference {}", complaint.complaint_id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(complaint.into(), message)),
    ))
}

/// Looks a complaint up by its complaint code
///
/// `GET /complaints/track/{complaint_id}`
pub async fn track_complaint(
    State(state): State<AppState>,
    Path(complaint_id): Path<String>,
) -> AppResult<Json<ApiResponse<ComplaintView>>> {
    let complaint = ComplaintRepo::find(&state.db, complaint_id.trim())?
        .ok_or_else(|| AppError::from(DomainError::not_found("Complaint", complaint_id)))?;

    Ok(Json(ApiResponse::ok(complaint.into())))
}

/// Lists every complaint filed from an email address, newest first
///
/// `GET /complaints/track-by-email/{email}`
pub async fn track_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<ComplaintView>>>> {
    let complaints = ComplaintRepo::list_by_email(&state.db, &email)?;

    Ok(Json(ApiResponse::ok(
        complaints.into_iter().map(ComplaintView::from).collect(),
    )))
}
