//! Service metadata: health check and the option lists behind form dropdowns.

use axum::{response::IntoResponse, Json};
use serde::Serialize;

use crate::display::to_display;
use crate::model::{ApiResponse, Category, Department, Priority, Status};

#[derive(Debug, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct Options {
    pub statuses: Vec<SelectOption>,
    pub priorities: Vec<SelectOption>,
    pub categories: Vec<SelectOption>,
    pub departments: Vec<SelectOption>,
}

fn option(value: &str) -> SelectOption {
    SelectOption {
        value: value.to_string(),
        label: to_display(value),
    }
}

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `GET /meta/options`: canonical values and display labels for form dropdowns.
pub async fn options() -> Json<ApiResponse<Options>> {
    Json(ApiResponse::ok(Options {
        statuses: Status::ALL.iter().map(|s| option(s.as_str())).collect(),
        priorities: Priority::KNOWN.iter().map(|p| option(p.as_str())).collect(),
        categories: Category::KNOWN.iter().map(|c| option(c.as_str())).collect(),
        departments: Department::ALL.iter().map(|d| option(d.as_str())).collect(),
    }))
}
