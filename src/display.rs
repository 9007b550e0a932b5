//! Mapping between canonical enum values and human-readable labels
//!
//! Canonical values are lowercase and underscore separated (`in_progress`,
//! `coach_maintenance`). Labels are Title Case with spaces (`In Progress`,
//! `Coach Maintenance`). Known values use a fixed label table so acronyms such
//! as `HVAC` survive; anything else falls back to a word-by-word heuristic.

/// Fixed labels for every canonical value the service knows about.
///
/// `electrical` and `catering` are shared between categories and departments.
const KNOWN_LABELS: &[(&str, &str)] = &[
    // Status
    ("pending", "Pending"),
    ("in_progress", "In Progress"),
    ("resolved", "Resolved"),
    ("rejected", "Rejected"),
    // Priority
    ("low", "Low"),
    ("medium", "Medium"),
    ("high", "High"),
    ("urgent", "Urgent"),
    // Category
    ("coach_maintenance", "Coach Maintenance"),
    ("hvac", "HVAC"),
    ("cleanliness", "Cleanliness"),
    ("catering", "Catering"),
    ("staff_conduct", "Staff Conduct"),
    ("electrical", "Electrical"),
    ("amenities", "Amenities"),
    // Department
    ("mechanical", "Mechanical"),
    ("housekeeping", "Housekeeping"),
    ("commercial", "Commercial"),
    ("security", "Security"),
    ("medical", "Medical"),
    // Metrics bucket
    ("unknown", "Unknown"),
];

/// Converts a canonical value into its display label.
///
/// Total: unknown values are split on `_` and capitalised word by word, so
/// `"wifi_outage"` renders as `"Wifi Outage"`.
pub fn to_display(canonical: &str) -> String {
    if let Some((_, label)) = KNOWN_LABELS.iter().find(|(value, _)| *value == canonical) {
        return (*label).to_string();
    }

    canonical
        .split(|c: char| c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Converts a display label (or any user-typed variant) back to canonical form.
///
/// Known labels match case-insensitively. Anything else is lowercased and its
/// words joined with `_`.
pub fn to_canonical(display: &str) -> String {
    let trimmed = display.trim();

    if let Some((value, _)) = KNOWN_LABELS
        .iter()
        .find(|(_, label)| label.eq_ignore_ascii_case(trimmed))
    {
        return (*value).to_string();
    }

    trimmed
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|word| !word.is_empty())
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
