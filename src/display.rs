use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::borrow::Cow;

/// `Jan 2, 2025, 3:04 PM`
const DISPLAY_FORMAT: &str = "%b %-d, %Y, %-I:%M %p";

/// Same as [`DISPLAY_FORMAT`], without padding modifiers which the parser does not need.
const DISPLAY_PARSE_FORMAT: &str = "%b %d, %Y, %I:%M %p";

/// Formats an upstream ISO 8601 timestamp for display, in UTC.
///
/// Missing or unparseable input yields an empty string.
pub fn format_iso_date(value: Option<&str>) -> String {
    let value = match value {
        Some(x) if !x.is_empty() => x,
        _ => return String::new(),
    };
    match DateTime::parse_from_rfc3339(value) {
        Ok(x) => x.with_timezone(&Utc).format(DISPLAY_FORMAT).to_string(),
        Err(_) => String::new(),
    }
}

/// Parses a stored commit date back into a sortable timestamp.
///
/// Accepts the display format, RFC 3339 and bare `YYYY-MM-DD` dates.
pub fn parse_display_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(value, DISPLAY_PARSE_FORMAT)
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|x| x.with_timezone(&Utc).naive_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|x| x.and_hms_opt(0, 0, 0))
        })
}

pub fn ellipsize(text: &str, threshold: usize) -> Cow<'_, str> {
    debug_assert!(threshold > 3);
    if text.chars().count() <= threshold && !text.contains('\n') {
        text.into()
    } else if text.chars().count() <= threshold {
        text.replace('\n', " ").into()
    } else {
        let text: String = text
            .chars()
            .map(|c| if c == '\n' { ' ' } else { c })
            .take(threshold - 3)
            .collect();
        let text: String = text.trim().chars().chain("...".chars()).collect();
        text.into()
    }
}
