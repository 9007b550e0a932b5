//! Data models for the complaint service
//!
//! This module defines the complaint record stored in the database, its closed
//! enumerations, and the request/response payloads exchanged over HTTP. All wire
//! formats use camelCase field names to match the admin dashboard.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::display::{to_canonical, to_display};
use crate::error::DomainError;

/// Number of description characters used when a complaint has no title.
pub const DERIVED_TITLE_CHARS: usize = 50;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Lifecycle status of a complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Pending,
    InProgress,
    Resolved,
    Rejected,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Pending,
        Status::InProgress,
        Status::Resolved,
        Status::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in_progress",
            Status::Resolved => "resolved",
            Status::Rejected => "rejected",
        }
    }

    /// Resolved and rejected complaints have no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Resolved | Status::Rejected)
    }

    /// Parses a canonical value or a display label.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let canonical = to_canonical(raw);
        Status::ALL
            .into_iter()
            .find(|s| s.as_str() == canonical)
            .ok_or_else(|| DomainError::InvalidEnumValue {
                field: "status",
                value: raw.to_string(),
            })
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complaint priority. Values outside the closed set are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
    Other(String),
}

impl Priority {
    pub const KNOWN: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Urgent,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
            Priority::Other(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Priority::Other(_))
    }

    /// Parses a value that must belong to the closed set.
    pub fn parse_known(raw: &str) -> Result<Self, DomainError> {
        match Priority::from(to_canonical(raw)) {
            Priority::Other(_) => Err(DomainError::InvalidEnumValue {
                field: "priority",
                value: raw.to_string(),
            }),
            known => Ok(known),
        }
    }
}

impl From<String> for Priority {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "low" => Priority::Low,
            "medium" => Priority::Medium,
            "high" => Priority::High,
            "urgent" => Priority::Urgent,
            _ => Priority::Other(raw),
        }
    }
}

impl From<Priority> for String {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// Complaint category. Values outside the closed set are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    CoachMaintenance,
    Hvac,
    Cleanliness,
    Catering,
    StaffConduct,
    Electrical,
    Amenities,
    Other(String),
}

impl Category {
    pub const KNOWN: [Category; 7] = [
        Category::CoachMaintenance,
        Category::Hvac,
        Category::Cleanliness,
        Category::Catering,
        Category::StaffConduct,
        Category::Electrical,
        Category::Amenities,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Category::CoachMaintenance => "coach_maintenance",
            Category::Hvac => "hvac",
            Category::Cleanliness => "cleanliness",
            Category::Catering => "catering",
            Category::StaffConduct => "staff_conduct",
            Category::Electrical => "electrical",
            Category::Amenities => "amenities",
            Category::Other(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Category::Other(_))
    }
}

impl From<String> for Category {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "coach_maintenance" => Category::CoachMaintenance,
            "hvac" => Category::Hvac,
            "cleanliness" => Category::Cleanliness,
            "catering" => Category::Catering,
            "staff_conduct" => Category::StaffConduct,
            "electrical" => Category::Electrical,
            "amenities" => Category::Amenities,
            _ => Category::Other(raw),
        }
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// Organisational unit a complaint is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    Mechanical,
    Electrical,
    Housekeeping,
    Catering,
    Commercial,
    Security,
    Medical,
}

impl Department {
    pub const ALL: [Department; 7] = [
        Department::Mechanical,
        Department::Electrical,
        Department::Housekeeping,
        Department::Catering,
        Department::Commercial,
        Department::Security,
        Department::Medical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Mechanical => "mechanical",
            Department::Electrical => "electrical",
            Department::Housekeeping => "housekeeping",
            Department::Catering => "catering",
            Department::Commercial => "commercial",
            Department::Security => "security",
            Department::Medical => "medical",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let canonical = to_canonical(raw);
        Department::ALL
            .into_iter()
            .find(|d| d.as_str() == canonical)
            .ok_or_else(|| DomainError::InvalidEnumValue {
                field: "department",
                value: raw.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Complaint record
// ---------------------------------------------------------------------------

/// Journey metadata attached to a complaint. Every field is optional.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Journey {
    pub train_number: Option<String>,
    pub train_name: Option<String>,
    pub coach: Option<String>,
    /// Passenger reservation reference number.
    pub pnr: Option<String>,
    pub journey_date: Option<NaiveDate>,
    pub station: Option<String>,
}

/// A complaint record as stored in the `complaints_v1` table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    /// Opaque internal identifier (UUID v7, so keys sort by creation time).
    pub id: String,

    /// Human-facing sequential code, e.g. `RMD2024011`.
    pub complaint_id: String,

    pub name: String,
    pub email: String,
    pub phone: Option<String>,

    pub title: Option<String>,
    pub description: String,

    pub category: Option<Category>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: Status,

    #[serde(flatten)]
    pub journey: Journey,

    pub department: Option<Department>,
    pub assigned_to: Option<String>,

    /// References to uploaded media (URLs or storage keys).
    #[serde(default)]
    pub media: Vec<String>,

    pub admin_notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Set when the complaint enters `resolved`.
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Complaint {
    /// Builds a fresh `pending` complaint from validated input.
    pub fn new(id: String, complaint_id: String, input: NewComplaint, now: DateTime<Utc>) -> Self {
        Complaint {
            id,
            complaint_id,
            name: input.name,
            email: input.email,
            phone: input.phone,
            title: input.title,
            description: input.description,
            category: input.category,
            priority: input.priority,
            status: Status::Pending,
            journey: input.journey,
            department: None,
            assigned_to: None,
            media: input.media,
            admin_notes: None,
            created_at: now,
            updated_at: now,
            resolved_at: None,
        }
    }

    /// Title shown in list rows: the title, or the start of the description.
    pub fn display_title(&self) -> String {
        if let Some(title) = self.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            return title.to_string();
        }

        let description = self.description.trim();
        if description.chars().count() > DERIVED_TITLE_CHARS {
            let head: String = description.chars().take(DERIVED_TITLE_CHARS).collect();
            format!("{head}...")
        } else {
            description.to_string()
        }
    }
}

/// Complaint as returned to clients: the stored record plus display labels.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintView {
    #[serde(flatten)]
    pub complaint: Complaint,
    pub display_title: String,
    pub status_label: String,
    pub priority_label: String,
    pub category_label: Option<String>,
    pub department_label: Option<String>,
}

impl From<Complaint> for ComplaintView {
    fn from(complaint: Complaint) -> Self {
        ComplaintView {
            display_title: complaint.display_title(),
            status_label: to_display(complaint.status.as_str()),
            priority_label: to_display(complaint.priority.as_str()),
            category_label: complaint.category.as_ref().map(|c| to_display(c.as_str())),
            department_label: complaint.department.map(|d| to_display(d.as_str())),
            complaint,
        }
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Request payload for `POST /complaints`.
///
/// # Example
/// ```json
/// {
///   "name": "Asha Rao",
///   "email": "asha@example.com",
///   "description": "Berth 23 reading light is broken",
///   "category": "electrical",
///   "trainNumber": "12951",
///   "pnr": "4521789630"
/// }
/// ```
#[derive(Deserialize, Validate, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateComplaintRequest {
    #[validate(length(min = 1, max = 120, message = "name is required"))]
    #[serde(default)]
    pub name: String,

    #[validate(email(message = "a valid email address is required"))]
    #[serde(default)]
    pub email: String,

    #[validate(length(max = 20, message = "phone number is too long"))]
    pub phone: Option<String>,

    #[validate(length(max = 200, message = "title must be at most 200 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 5000, message = "description is required"))]
    #[serde(default)]
    pub description: String,

    pub category: Option<Category>,
    pub priority: Option<Priority>,

    #[serde(flatten)]
    pub journey: Journey,

    #[serde(default)]
    pub media: Vec<String>,
}

/// Validated, normalised input for creating a complaint.
#[derive(Debug, Clone)]
pub struct NewComplaint {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub title: Option<String>,
    pub description: String,
    pub category: Option<Category>,
    pub priority: Priority,
    pub journey: Journey,
    pub media: Vec<String>,
}

impl TryFrom<CreateComplaintRequest> for NewComplaint {
    type Error = DomainError;

    fn try_from(request: CreateComplaintRequest) -> Result<Self, Self::Error> {
        request.validate()?;

        let description = request.description.trim().to_string();
        if description.is_empty() {
            return Err(DomainError::Validation("description: description is required".into()));
        }
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::Validation("name: name is required".into()));
        }

        Ok(NewComplaint {
            name,
            email: request.email.trim().to_lowercase(),
            phone: non_blank(request.phone),
            title: non_blank(request.title),
            description,
            category: request.category.filter(|c| !c.as_str().is_empty()),
            priority: request.priority.unwrap_or_default(),
            journey: Journey {
                train_number: non_blank(request.journey.train_number),
                train_name: non_blank(request.journey.train_name),
                coach: non_blank(request.journey.coach),
                pnr: non_blank(request.journey.pnr),
                journey_date: request.journey.journey_date,
                station: non_blank(request.journey.station),
            },
            media: request
                .media
                .into_iter()
                .filter(|m| !m.trim().is_empty())
                .collect(),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Request payload for `PATCH /admin/complaints/{id}`.
///
/// Values may be canonical (`in_progress`) or labels (`In Progress`). An empty
/// string clears `department`, `assignedTo` or `adminNotes`.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateComplaintRequest {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub department: Option<String>,
    pub assigned_to: Option<String>,
    pub admin_notes: Option<String>,
}

/// Query parameters for `GET /admin/complaints`.
///
/// # Example
/// Query string: `?status=pending&search=RMD2024&page=2&limit=20`
#[derive(Deserialize, Debug, Default)]
pub struct ListParams {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,

    /// Page number (starts from 1). Defaults to 1.
    pub page: Option<usize>,

    /// Items per page. Defaults to 10, maximum is 100.
    pub limit: Option<usize>,
}

/// Query parameters for `GET /admin/dashboard/charts`.
#[derive(Deserialize, Debug, Default)]
pub struct ChartParams {
    pub days: Option<usize>,
    pub weeks: Option<usize>,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Standard `{success, data?, message?}` response envelope.
#[derive(Serialize, Debug)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub items_per_page: usize,
}

#[derive(Serialize, Debug)]
pub struct ComplaintPage {
    pub complaints: Vec<ComplaintView>,
    pub pagination: Pagination,
}

/// Returned by `DELETE /admin/complaints/{id}`.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DeletedComplaint {
    pub id: String,
    pub complaint_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(description: &str) -> CreateComplaintRequest {
        CreateComplaintRequest {
            name: "Asha Rao".into(),
            email: "Asha@Example.com".into(),
            description: description.into(),
            ..Default::default()
        }
    }

    fn complaint(title: Option<&str>, description: &str) -> Complaint {
        let input = NewComplaint::try_from(CreateComplaintRequest {
            title: title.map(String::from),
            ..request(description)
        })
        .unwrap();
        Complaint::new("id-1".into(), "RMD2024001".into(), input, Utc::now())
    }

    #[test]
    fn derived_title_truncates_long_descriptions() {
        let description =
            "The coach door on S4 does not close properly and rattles for the whole journey";
        let c = complaint(None, description);
        let expected: String = description.chars().take(DERIVED_TITLE_CHARS).collect();
        assert_eq!(c.display_title(), format!("{expected}..."));
        assert_eq!(c.display_title().chars().count(), DERIVED_TITLE_CHARS + 3);
    }

    #[test]
    fn derived_title_keeps_short_descriptions() {
        let c = complaint(None, "Fan not working");
        assert_eq!(c.display_title(), "Fan not working");
    }

    #[test]
    fn explicit_title_wins() {
        let c = complaint(Some("AC vent noise"), "Loud rattling from the vent");
        assert_eq!(c.display_title(), "AC vent noise");
    }

    #[test]
    fn unknown_category_round_trips_verbatim() {
        let json = serde_json::json!("wifi_outage");
        let category: Category = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(category, Category::Other("wifi_outage".into()));
        assert_eq!(serde_json::to_value(&category).unwrap(), json);
    }

    #[test]
    fn known_priority_deserializes_to_variant() {
        let priority: Priority = serde_json::from_str("\"urgent\"").unwrap();
        assert_eq!(priority, Priority::Urgent);
    }

    #[test]
    fn parse_known_priority_rejects_unknown() {
        assert_eq!(Priority::parse_known("High").unwrap(), Priority::High);
        assert!(matches!(
            Priority::parse_known("critical"),
            Err(DomainError::InvalidEnumValue { field: "priority", .. })
        ));
    }

    #[test]
    fn status_parses_labels_and_canonical_values() {
        assert_eq!(Status::parse("in_progress").unwrap(), Status::InProgress);
        assert_eq!(Status::parse("In Progress").unwrap(), Status::InProgress);
        assert!(Status::parse("closed").is_err());
    }

    #[test]
    fn new_complaint_normalises_input() {
        let input = NewComplaint::try_from(CreateComplaintRequest {
            phone: Some("   ".into()),
            ..request("  Toilet not cleaned  ")
        })
        .unwrap();
        assert_eq!(input.email, "asha@example.com");
        assert_eq!(input.description, "Toilet not cleaned");
        assert_eq!(input.phone, None);
        assert_eq!(input.priority, Priority::Medium);
    }

    #[test]
    fn blank_description_is_rejected() {
        let err = NewComplaint::try_from(request("   ")).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn invalid_email_is_rejected() {
        let err = NewComplaint::try_from(CreateComplaintRequest {
            email: "not-an-email".into(),
            ..request("Seat torn")
        })
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("email")));
    }

    #[test]
    fn stored_record_uses_camel_case() {
        let c = complaint(None, "Fan not working");
        let value = serde_json::to_value(&c).unwrap();
        assert_eq!(value["complaintId"], "RMD2024001");
        assert_eq!(value["status"], "pending");
        assert_eq!(value["priority"], "medium");
        assert!(value.get("trainNumber").is_some());
    }
}
