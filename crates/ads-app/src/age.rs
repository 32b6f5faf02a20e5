//! Relative "posted ... ago" labels for listings.

use chrono::{DateTime, Local, Utc};

/// Formats `created_at` relative to the wall clock at call time.
pub fn format_relative_age(created_at: DateTime<Utc>) -> String {
    format_relative_age_at(created_at, Utc::now())
}

/// Formats `created_at` relative to `now`.
///
/// Buckets: `now` (< 1 min), `{n}m ago` (< 60 min), `{n}h ago` (< 24 h),
/// `{n}d ago` (< 7 d), then the local short date (`M/D/YYYY`).
pub fn format_relative_age_at(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - created_at).num_minutes();
    if minutes < 1 {
        return "now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes}m ago");
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }

    let days = hours / 24;
    if days < 7 {
        return format!("{days}d ago");
    }

    created_at.with_timezone(&Local).format("%-m/%-d/%Y").to_string()
}
