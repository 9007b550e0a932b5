//! Dashboard aggregation over complaint collections
//!
//! All functions are pure: they take the complaints, the current instant and the
//! configured timezone, and never touch storage.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Utc};
use serde::Serialize;

use crate::display::to_display;
use crate::model::{Category, Complaint, Priority, Status};

/// Bucket for categories and priorities outside the closed enumerations.
pub const UNKNOWN_BUCKET: &str = "unknown";

pub const DEFAULT_DAYS: usize = 7;
pub const MAX_DAYS: usize = 90;
pub const DEFAULT_WEEKS: usize = 8;
pub const MAX_WEEKS: usize = 52;

/// Headline numbers for `GET /admin/dashboard/metrics`.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total: u64,
    pub pending: u64,
    pub in_progress: u64,
    pub resolved: u64,
    pub rejected: u64,
    pub resolved_today: u64,
    /// High or urgent complaints that are not yet resolved or rejected.
    pub high_priority_open: u64,
    /// Mean hours from submission to resolution, if anything is resolved.
    pub avg_resolution_hours: Option<f64>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct GroupCount {
    pub key: String,
    pub label: String,
    pub count: u64,
}

/// Submitted and resolved counts for one day or ISO week.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TrendPoint {
    pub bucket: String,
    pub submitted: u64,
    pub resolved: u64,
}

/// Payload for `GET /admin/dashboard/charts`.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub by_status: Vec<GroupCount>,
    pub by_category: Vec<GroupCount>,
    pub by_priority: Vec<GroupCount>,
    pub daily: Vec<TrendPoint>,
    pub weekly: Vec<TrendPoint>,
}

/// When the complaint was resolved, if it is resolved.
///
/// Records written before `resolvedAt` was tracked fall back to `updatedAt`,
/// which over-counts if such a complaint is edited again after resolution.
pub fn resolution_time(complaint: &Complaint) -> Option<DateTime<Utc>> {
    match complaint.status {
        Status::Resolved => Some(complaint.resolved_at.unwrap_or(complaint.updated_at)),
        _ => None,
    }
}

fn local_date(instant: DateTime<Utc>, tz: &FixedOffset) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

pub fn dashboard_metrics(
    complaints: &[Complaint],
    now: DateTime<Utc>,
    tz: &FixedOffset,
) -> DashboardMetrics {
    let today = local_date(now, tz);

    let mut metrics = DashboardMetrics {
        total: complaints.len() as u64,
        pending: 0,
        in_progress: 0,
        resolved: 0,
        rejected: 0,
        resolved_today: 0,
        high_priority_open: 0,
        avg_resolution_hours: None,
    };

    let mut resolution_hours = Vec::new();

    for complaint in complaints {
        match complaint.status {
            Status::Pending => metrics.pending += 1,
            Status::InProgress => metrics.in_progress += 1,
            Status::Resolved => metrics.resolved += 1,
            Status::Rejected => metrics.rejected += 1,
        }

        if matches!(complaint.priority, Priority::High | Priority::Urgent)
            && !complaint.status.is_terminal()
        {
            metrics.high_priority_open += 1;
        }

        if let Some(resolved) = resolution_time(complaint) {
            if local_date(resolved, tz) == today {
                metrics.resolved_today += 1;
            }
            let elapsed = resolved - complaint.created_at;
            resolution_hours.push(elapsed.num_seconds().max(0) as f64 / 3600.0);
        }
    }

    if !resolution_hours.is_empty() {
        let sum: f64 = resolution_hours.iter().sum();
        metrics.avg_resolution_hours = Some(sum / resolution_hours.len() as f64);
    }

    metrics
}

/// Counts `keys` in the order of `known`, appending [`UNKNOWN_BUCKET`] when needed.
fn group<'a, I>(known: &[&str], keys: I, always_unknown: bool) -> Vec<GroupCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, u64> = HashMap::new();
    let mut unknown = 0u64;

    for key in keys {
        match known.iter().find(|k| **k == key) {
            Some(k) => *counts.entry(*k).or_default() += 1,
            None => unknown += 1,
        }
    }

    let mut groups: Vec<GroupCount> = known
        .iter()
        .map(|key| GroupCount {
            key: (*key).to_string(),
            label: to_display(key),
            count: counts.get(key).copied().unwrap_or(0),
        })
        .collect();

    if unknown > 0 || always_unknown {
        groups.push(GroupCount {
            key: UNKNOWN_BUCKET.to_string(),
            label: to_display(UNKNOWN_BUCKET),
            count: unknown,
        });
    }

    groups
}

pub fn count_by_status(complaints: &[Complaint]) -> Vec<GroupCount> {
    let known: Vec<&str> = Status::ALL.iter().map(|s| s.as_str()).collect();
    group(&known, complaints.iter().map(|c| c.status.as_str()), false)
}

/// Counts per category; missing and unrecognised categories land in `unknown`.
pub fn count_by_category(complaints: &[Complaint]) -> Vec<GroupCount> {
    let known: Vec<&str> = Category::KNOWN.iter().map(|c| c.as_str()).collect();
    group(
        &known,
        complaints
            .iter()
            .map(|c| c.category.as_ref().map_or(UNKNOWN_BUCKET, |c| c.as_str())),
        true,
    )
}

pub fn count_by_priority(complaints: &[Complaint]) -> Vec<GroupCount> {
    let known: Vec<&str> = Priority::KNOWN.iter().map(|p| p.as_str()).collect();
    group(&known, complaints.iter().map(|c| c.priority.as_str()), true)
}

/// Per-day counts for the last `days` calendar days, oldest first.
pub fn daily_series(
    complaints: &[Complaint],
    now: DateTime<Utc>,
    tz: &FixedOffset,
    days: usize,
) -> Vec<TrendPoint> {
    let today = local_date(now, tz);
    let mut buckets: HashMap<NaiveDate, (u64, u64)> = HashMap::new();

    for complaint in complaints {
        buckets.entry(local_date(complaint.created_at, tz)).or_default().0 += 1;
        if let Some(resolved) = resolution_time(complaint) {
            buckets.entry(local_date(resolved, tz)).or_default().1 += 1;
        }
    }

    (0..days as i64)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            let (submitted, resolved) = buckets.get(&date).copied().unwrap_or_default();
            TrendPoint {
                bucket: date.format("%Y-%m-%d").to_string(),
                submitted,
                resolved,
            }
        })
        .collect()
}

/// Per-ISO-week counts for the last `weeks` weeks, oldest first.
pub fn weekly_series(
    complaints: &[Complaint],
    now: DateTime<Utc>,
    tz: &FixedOffset,
    weeks: usize,
) -> Vec<TrendPoint> {
    let today = local_date(now, tz);
    let this_monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    let week_key = |date: NaiveDate| {
        let iso = date.iso_week();
        (iso.year(), iso.week())
    };

    let mut buckets: HashMap<(i32, u32), (u64, u64)> = HashMap::new();
    for complaint in complaints {
        buckets
            .entry(week_key(local_date(complaint.created_at, tz)))
            .or_default()
            .0 += 1;
        if let Some(resolved) = resolution_time(complaint) {
            buckets.entry(week_key(local_date(resolved, tz))).or_default().1 += 1;
        }
    }

    (0..weeks as i64)
        .rev()
        .map(|offset| {
            let (year, week) = week_key(this_monday - Duration::weeks(offset));
            let (submitted, resolved) = buckets.get(&(year, week)).copied().unwrap_or_default();
            TrendPoint {
                bucket: format!("{year}-W{week:02}"),
                submitted,
                resolved,
            }
        })
        .collect()
}

pub fn chart_data(
    complaints: &[Complaint],
    now: DateTime<Utc>,
    tz: &FixedOffset,
    days: Option<usize>,
    weeks: Option<usize>,
) -> ChartData {
    let days = days.unwrap_or(DEFAULT_DAYS).clamp(1, MAX_DAYS);
    let weeks = weeks.unwrap_or(DEFAULT_WEEKS).clamp(1, MAX_WEEKS);

    ChartData {
        by_status: count_by_status(complaints),
        by_category: count_by_category(complaints),
        by_priority: count_by_priority(complaints),
        daily: daily_series(complaints, now, tz, days),
        weekly: weekly_series(complaints, now, tz, weeks),
    }
}
