//! Filtering, search and pagination over complaint collections
//!
//! A [`ComplaintFilter`] is a pure predicate: every provided dimension must
//! match (logical AND), unset dimensions are unconstrained, and the relative
//! order of the input is preserved.

use crate::model::{Complaint, ListParams, Pagination};

/// Sentinel the dashboard dropdowns send for "no constraint".
pub const ALL_SENTINEL: &str = "All";

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplaintFilter {
    /// Canonical status value, e.g. `in_progress`.
    pub status: Option<String>,
    /// Canonical priority value, e.g. `urgent`.
    pub priority: Option<String>,
    /// Canonical category value, e.g. `coach_maintenance`.
    pub category: Option<String>,
    /// Case-insensitive substring over title, complaint code and train name.
    pub search: Option<String>,
}

impl From<&ListParams> for ComplaintFilter {
    fn from(params: &ListParams) -> Self {
        ComplaintFilter {
            status: params.status.clone(),
            priority: params.priority.clone(),
            category: params.category.clone(),
            search: params.search.clone(),
        }
    }
}

impl ComplaintFilter {
    /// Whether `complaint` satisfies every provided constraint.
    pub fn matches(&self, complaint: &Complaint) -> bool {
        if let Some(status) = constraint(&self.status) {
            if complaint.status.as_str() != status {
                return false;
            }
        }

        if let Some(priority) = constraint(&self.priority) {
            if complaint.priority.as_str() != priority {
                return false;
            }
        }

        if let Some(category) = constraint(&self.category) {
            if complaint.category.as_ref().map(|c| c.as_str()) != Some(category) {
                return false;
            }
        }

        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(query) => matches_search(complaint, &query.to_lowercase()),
            None => true,
        }
    }

    /// Returns the matching complaints in their original order.
    pub fn apply<I>(&self, complaints: I) -> Vec<Complaint>
    where
        I: IntoIterator<Item = Complaint>,
    {
        complaints.into_iter().filter(|c| self.matches(c)).collect()
    }
}

/// Treats unset, empty and `"All"` as unconstrained.
fn constraint(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(ALL_SENTINEL))
}

fn matches_search(complaint: &Complaint, needle: &str) -> bool {
    let haystacks = [
        Some(complaint.display_title()),
        Some(complaint.complaint_id.clone()),
        complaint.journey.train_name.clone(),
    ];

    haystacks
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Slices one page out of an already filtered list.
///
/// `page` starts at 1 and is clamped to at least 1; `limit` defaults to
/// [`DEFAULT_PAGE_SIZE`] and is clamped to `1..=MAX_PAGE_SIZE`.
pub fn paginate<T>(items: Vec<T>, page: Option<usize>, limit: Option<usize>) -> (Vec<T>, Pagination) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

    let total_items = items.len();
    let total_pages = total_items.div_ceil(limit);
    let offset = (page - 1).saturating_mul(limit);

    let page_items = items.into_iter().skip(offset).take(limit).collect();

    (
        page_items,
        Pagination {
            current_page: page,
            total_pages,
            total_items,
            items_per_page: limit,
        },
    )
}
