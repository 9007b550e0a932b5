//! Complaint lifecycle rules
//!
//! Defines which status changes are allowed and how an admin update is applied
//! to a stored complaint.
//!
//! Strict transition rules:
//! - `pending`     -> `in_progress`, `rejected`
//! - `in_progress` -> `resolved`, `rejected`
//! - `resolved`    -> (terminal)
//! - `rejected`    -> (terminal)
//!
//! The permissive policy accepts any status change and exists for deployments
//! that relied on unrestricted admin edits.

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::model::{Complaint, Department, Priority, Status, UpdateComplaintRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPolicy {
    Strict,
    Permissive,
}

/// Returns the statuses `from` may move to under the strict policy.
pub fn allowed_transitions(from: Status) -> &'static [Status] {
    match from {
        Status::Pending => &[Status::InProgress, Status::Rejected],
        Status::InProgress => &[Status::Resolved, Status::Rejected],
        Status::Resolved | Status::Rejected => &[],
    }
}

/// Checks that `from -> to` is allowed. Staying in the same status is not a
/// transition and always passes.
pub fn validate_transition(
    policy: TransitionPolicy,
    from: Status,
    to: Status,
) -> Result<(), DomainError> {
    if from == to || policy == TransitionPolicy::Permissive {
        return Ok(());
    }
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(DomainError::InvalidTransition { from, to })
    }
}

/// Moves `complaint` to `to`, stamping `updated_at` and `resolved_at`.
///
/// Returns `true` when the status actually changed.
pub fn transition(
    complaint: &mut Complaint,
    to: Status,
    policy: TransitionPolicy,
    now: DateTime<Utc>,
) -> Result<bool, DomainError> {
    validate_transition(policy, complaint.status, to)?;

    if complaint.status == to {
        return Ok(false);
    }

    complaint.status = to;
    complaint.updated_at = now;
    complaint.resolved_at = match to {
        Status::Resolved => Some(now),
        _ => None,
    };

    Ok(true)
}

/// A parsed, validated admin update.
///
/// For the clearable fields the outer `Option` means "leave untouched" and the
/// inner `None` means "clear".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplaintPatch {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub department: Option<Option<Department>>,
    pub assigned_to: Option<Option<String>>,
    pub admin_notes: Option<Option<String>>,
}

impl ComplaintPatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.priority.is_none()
            && self.department.is_none()
            && self.assigned_to.is_none()
            && self.admin_notes.is_none()
    }
}

impl TryFrom<UpdateComplaintRequest> for ComplaintPatch {
    type Error = DomainError;

    fn try_from(request: UpdateComplaintRequest) -> Result<Self, Self::Error> {
        let patch = ComplaintPatch {
            status: request.status.as_deref().map(Status::parse).transpose()?,
            priority: request
                .priority
                .as_deref()
                .map(Priority::parse_known)
                .transpose()?,
            department: request
                .department
                .as_deref()
                .map(|raw| match raw.trim() {
                    "" => Ok(None),
                    value => Department::parse(value).map(Some),
                })
                .transpose()?,
            assigned_to: request.assigned_to.map(clearable),
            admin_notes: request.admin_notes.map(clearable),
        };

        if patch.is_empty() {
            return Err(DomainError::Validation(
                "at least one of status, priority, department, assignedTo or adminNotes is required"
                    .into(),
            ));
        }

        Ok(patch)
    }
}

fn clearable(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Applies `patch` to `complaint` atomically: on error nothing is modified.
pub fn apply_patch(
    complaint: &mut Complaint,
    patch: &ComplaintPatch,
    policy: TransitionPolicy,
    now: DateTime<Utc>,
) -> Result<(), DomainError> {
    if let Some(to) = patch.status {
        validate_transition(policy, complaint.status, to)?;
    }

    if let Some(to) = patch.status {
        transition(complaint, to, policy, now)?;
    }
    if let Some(priority) = &patch.priority {
        complaint.priority = priority.clone();
    }
    if let Some(department) = patch.department {
        complaint.department = department;
    }
    if let Some(assigned_to) = &patch.assigned_to {
        complaint.assigned_to = assigned_to.clone();
    }
    if let Some(admin_notes) = &patch.admin_notes {
        complaint.admin_notes = admin_notes.clone();
    }

    complaint.updated_at = now;
    Ok(())
}
