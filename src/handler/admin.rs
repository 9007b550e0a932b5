//! Admin endpoints: complaint triage and dashboard aggregates.
//!
//! Every route here sits behind [`auth_middleware`](crate::middleware::auth_middleware).

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;

use crate::database::AppState;
use crate::error::{AppError, AppResult, DomainError};
use crate::extract::{AppJson, AppQuery};
use crate::filter::{paginate, ComplaintFilter};
use crate::lifecycle::{apply_patch, ComplaintPatch};
use crate::metrics::{chart_data, dashboard_metrics, ChartData, DashboardMetrics};
use crate::middleware::AuthUser;
use crate::model::{
    ApiResponse, ChartParams, ComplaintPage, ComplaintView, DeletedComplaint, ListParams,
    UpdateComplaintRequest,
};
use crate::repository::ComplaintRepo;

/// Lists complaints with filtering and pagination
///
/// `GET /admin/complaints?status=&priority=&category=&search=&page=&limit=`
///
/// Results are newest first. Filters combine with AND; `All` or an empty
/// value leaves a dimension unconstrained.
pub async fn list_complaints(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ListParams>,
) -> AppResult<Json<ApiResponse<ComplaintPage>>> {
    let filter = ComplaintFilter::from(&params);
    let matching = filter.apply(ComplaintRepo::list(&state.db)?);
    let (page, pagination) = paginate(matching, params.page, params.limit);

    Ok(Json(ApiResponse::ok(ComplaintPage {
        complaints: page.into_iter().map(ComplaintView::from).collect(),
        pagination,
    })))
}

/// Fetches one complaint by internal id or complaint code
///
/// `GET /admin/complaints/{id}`
pub async fn get_complaint(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<ComplaintView>>> {
    let complaint = ComplaintRepo::find(&state.db, &id)?
        .ok_or_else(|| AppError::from(DomainError::not_found("Complaint", id)))?;

    Ok(Json(ApiResponse::ok(complaint.into())))
}

/// Partially updates status, priority, department, assignee or notes
///
/// `PATCH /admin/complaints/{id}`
///
/// # Response
///
/// - **200 OK** - the updated complaint
/// - **400 Bad Request** - unknown enum value or empty body
/// - **404 Not Found** - no such complaint
/// - **409 Conflict** - status change not allowed from the current status
pub async fn update_complaint(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateComplaintRequest>,
) -> AppResult<Json<ApiResponse<ComplaintView>>> {
    let patch = ComplaintPatch::try_from(payload)?;
    let policy = state.config.transition_policy();

    let updated = ComplaintRepo::update(&state.db, &id, |complaint| {
        apply_patch(complaint, &patch, policy, Utc::now()).map_err(AppError::from)
    })?
    .ok_or_else(|| AppError::from(DomainError::not_found("Complaint", id)))?;

    tracing::info!(
        complaint_id = %updated.complaint_id,
        status = %updated.status,
        priority = updated.priority.as_str(),
        admin = %user.email,
        "Complaint updated"
    );

    Ok(Json(ApiResponse::with_message(
        updated.into(),
        "Complaint updated successfully",
    )))
}

/// Permanently deletes a complaint
///
/// `DELETE /admin/complaints/{id}`
///
/// Deleting an id that does not exist is a 404, never a silent success.
pub async fn delete_complaint(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<DeletedComplaint>>> {
    let deleted = ComplaintRepo::delete(&state.db, &id)?
        .ok_or_else(|| AppError::from(DomainError::not_found("Complaint", id)))?;

    tracing::warn!(
        complaint_id = %deleted.complaint_id,
        admin = %user.email,
        "Complaint deleted"
    );

    Ok(Json(ApiResponse::with_message(
        DeletedComplaint {
            id: deleted.id,
            complaint_id: deleted.complaint_id,
        },
        "Complaint deleted successfully",
    )))
}

/// Headline counts for the dashboard
///
/// `GET /admin/dashboard/metrics`
pub async fn dashboard_metrics_handler(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<DashboardMetrics>>> {
    let complaints = ComplaintRepo::list(&state.db)?;
    let metrics = dashboard_metrics(&complaints, Utc::now(), &state.config.timezone);
    Ok(Json(ApiResponse::ok(metrics)))
}

/// Grouped counts and trend series for dashboard charts
///
/// `GET /admin/dashboard/charts?days=7&weeks=8`
pub async fn dashboard_charts(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ChartParams>,
) -> AppResult<Json<ApiResponse<ChartData>>> {
    let complaints = ComplaintRepo::list(&state.db)?;
    let charts = chart_data(
        &complaints,
        Utc::now(),
        &state.config.timezone,
        params.days,
        params.weeks,
    );
    Ok(Json(ApiResponse::ok(charts)))
}
