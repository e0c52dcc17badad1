//! UTC timestamp helpers shared by the ledger and the axis register.
//!
//! Ledger timestamps are stored as text with second precision
//! (`YYYY-MM-DDTHH:MM:SSZ`) so the first 10 characters are always the UTC
//! calendar day used by the history buckets.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

const DAY_LABEL_FORMAT: &str = "%Y-%m-%d";
const NAIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Formats a UTC instant as a second-precision ISO-8601 string.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Current wall-clock time as a ledger timestamp.
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// Normalizes a controller-supplied timestamp into ledger format.
///
/// Accepts RFC 3339 (any offset, converted to UTC) or a naive
/// `YYYY-MM-DDTHH:MM:SS[.fff]` which is taken as UTC. Returns `None` for
/// anything else.
pub fn normalize_timestamp(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(format_timestamp(parsed.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(trimmed, NAIVE_TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .map(|naive| format_timestamp(naive.and_utc()))
}

/// Calendar-day label used by the history series.
pub fn day_label(day: NaiveDate) -> String {
    day.format(DAY_LABEL_FORMAT).to_string()
}

/// Today's UTC calendar date.
pub fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}
