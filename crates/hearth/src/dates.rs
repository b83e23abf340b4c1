//! Post dates
//!
//! Front matter dates are free text. [`parse_date`] accepts the handful of
//! layouts posts are written with; dates without an offset are taken as UTC.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

const OFFSET_LAYOUTS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M %z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

const NAIVE_LAYOUTS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse a front matter date.
pub fn parse_date(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = strip_utc_suffix(text.trim());

    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date);
    }
    for layout in OFFSET_LAYOUTS {
        if let Ok(date) = DateTime::parse_from_str(text, layout) {
            return Some(date);
        }
    }
    for layout in NAIVE_LAYOUTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, layout) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

/// `2024-01-05 10:30:00 UTC` and `... GMT` carry no numeric offset.
fn strip_utc_suffix(text: &str) -> &str {
    ["UTC", "GMT"]
        .iter()
        .find_map(|zone| text.strip_suffix(zone))
        .map_or(text, str::trim_end)
}

/// Human readable date, e.g. `Jan 5, 2024`.
///
/// The date is shown in its own offset. Unparseable text is returned unchanged.
pub fn format_user_date(text: &str) -> String {
    match parse_date(text) {
        Some(date) => date.format("%b %-d, %Y").to_string(),
        None => text.to_string(),
    }
}

/// Atom timestamp in UTC, e.g. `2024-01-05T10:00:00Z`.
pub fn format_feed_date<Tz: chrono::TimeZone>(date: &DateTime<Tz>) -> String {
    date.with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}
