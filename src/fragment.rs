//! Helpers shared by the built-in query handlers.

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

/// `fragment` without `prefix`, matched ASCII case-insensitively.
pub(crate) fn strip_prefix_ignore_case<'a>(fragment: &'a str, prefix: &str) -> Option<&'a str> {
    let head = fragment.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&fragment[prefix.len()..])
    } else {
        None
    }
}

/// Content keys are indexed in lowercase hyphenated form.
pub(crate) fn normalize_key(raw: &str) -> String {
    let raw = raw.trim();
    Uuid::parse_str(raw)
        .map(|k| k.to_string())
        .unwrap_or_else(|_| raw.to_lowercase())
}

pub(crate) fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}
