use crate::shared::constants::UNKNOWN_PLACEHOLDER;
use chrono::{DateTime, SecondsFormat, Utc};

const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;

/// Human-readable size with binary thresholds, one decimal above bytes
pub fn format_size(bytes: Option<u64>) -> String {
    match bytes {
        None => UNKNOWN_PLACEHOLDER.to_string(),
        Some(b) if b < KIB => format!("{} B", b),
        Some(b) if b < MIB => format!("{:.1} KB", b as f64 / KIB as f64),
        Some(b) => format!("{:.1} MB", b as f64 / MIB as f64),
    }
}

/// ISO-8601 timestamp in UTC with millisecond precision
pub fn format_timestamp(time: Option<DateTime<Utc>>) -> String {
    match time {
        Some(t) => t.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => UNKNOWN_PLACEHOLDER.to_string(),
    }
}

/// Selection list label: `name  (date · size)`
pub fn format_choice_label(
    name: &str,
    time: Option<DateTime<Utc>>,
    size: Option<u64>,
) -> String {
    format!(
        "{}  ({} · {})",
        name,
        format_timestamp(time),
        format_size(size)
    )
}
