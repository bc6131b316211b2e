//! Text shown next to sections and rows.
//!
//! Everything takes `now` explicitly so callers decide which clock to use.

use crate::section::HistorySection;
use chrono::{DateTime, NaiveDate, Utc};

/// Long-form day title, e.g. `March 3, 2024`
pub fn day_title(day: NaiveDate) -> String {
    day.format("%B %-d, %Y").to_string()
}

/// Title relative to today: `Today`, `Yesterday`, `3 days ago`.
/// Days in the future get the long-form title.
pub fn relative_day_title(day: NaiveDate, now: DateTime<Utc>) -> String {
    let days = (now.date_naive() - day).num_days();
    match days {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        n if n > 1 => format!("{} days ago", n),
        _ => day_title(day),
    }
}

/// Header for the section at `index`. Only the newest section is titled
/// relative to today; the rest keep their stored title.
pub fn section_header(index: usize, section: &HistorySection, now: DateTime<Utc>) -> String {
    if index == 0 {
        relative_day_title(section.day, now)
    } else {
        section.title.clone()
    }
}

/// Row label for a revision: elapsed time for edits made today (UTC),
/// otherwise the wall-clock time.
pub fn time_label(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    if timestamp.date_naive() != now.date_naive() {
        return format!("{} UTC", timestamp.format("%H:%M"));
    }

    let elapsed = now.signed_duration_since(timestamp).max(chrono::Duration::zero());
    let hours = elapsed.num_hours();
    let minutes = elapsed.num_minutes();
    if hours > 0 {
        format!("{}h ago", hours)
    } else if minutes > 0 {
        format!("{}m ago", minutes)
    } else {
        format!("{}s ago", elapsed.num_seconds())
    }
}
