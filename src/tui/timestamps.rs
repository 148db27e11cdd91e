use chrono::{DateTime, Datelike, Utc};

/// Age of a history entry:
/// - Relative for <7 days: "just now", "12m ago", "3d ago"
/// - Absolute for ≥7 days: "Jan 15", "Dec 3, 2024"
pub fn format_timestamp(timestamp: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(*timestamp);

    if duration.num_days() < 7 {
        format_relative(duration.num_seconds())
    } else if timestamp.year() == now.year() {
        timestamp.format("%b %-d").to_string()
    } else {
        timestamp.format("%b %-d, %Y").to_string()
    }
}

fn format_relative(seconds: i64) -> String {
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        format!("{}d ago", days)
    } else if hours > 0 {
        format!("{}h ago", hours)
    } else if minutes > 0 {
        format!("{}m ago", minutes)
    } else {
        "just now".to_string()
    }
}

/// Time until a usage counter resets: "in 2d", "in 5h 20m", "in 45m", "soon".
/// `None` when the server did not report a reset time.
pub fn format_reset(reset: Option<&DateTime<Utc>>, now: &DateTime<Utc>) -> Option<String> {
    let remaining = reset?.signed_duration_since(*now);
    let minutes = remaining.num_minutes();
    let hours = minutes / 60;
    let days = hours / 24;

    let text = if minutes < 1 {
        "soon".to_string()
    } else if days > 0 {
        format!("in {}d", days)
    } else if hours > 0 {
        format!("in {}h {}m", hours, minutes % 60)
    } else {
        format!("in {}m", minutes)
    };
    Some(text)
}
