//! Display formatting for context cards and document listings.
//!
//! Rounding is half away from zero at one decimal, and dates use an explicit
//! chrono pattern, so output does not depend on the host locale or time zone.

use std::fmt::Write as _;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Shown when a metadata field is absent.
pub const UNKNOWN: &str = "unknown";

fn one_decimal(value: f64) -> String {
    format!("{:.1}", (value * 10.0).round() / 10.0)
}

/// Relevance score in [0,1] as a percentage: `0.873` → `87.3`.
pub fn relevance_percent(score: f64) -> String {
    one_decimal(score * 100.0)
}

/// Byte count as kilobytes: `2048` → `2.0`.
pub fn kilobytes(bytes: f64) -> String {
    one_decimal(bytes / 1024.0)
}

/// Part of a MIME-like type after the last `/`: `application/pdf` → `pdf`.
pub fn type_suffix(file_type: &str) -> &str {
    file_type.rsplit('/').next().unwrap_or(file_type)
}

/// Parse the date representations the service is known to send.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let s = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc().date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt.date());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    // ISO 8601 reduced precision: `YYYY-MM` and bare `YYYY`.
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d") {
        return Some(d);
    }
    if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
        return s.parse().ok().and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1));
    }
    s.parse::<f64>().ok().and_then(epoch_date)
}

/// Epoch seconds to a UTC calendar date.
pub fn epoch_date(secs: f64) -> Option<NaiveDate> {
    if !secs.is_finite() {
        return None;
    }
    DateTime::<Utc>::from_timestamp(secs.trunc() as i64, 0).map(|dt| dt.date_naive())
}

/// Format `date` with a strftime `pattern`; an invalid pattern falls back to ISO 8601.
pub fn format_date(date: NaiveDate, pattern: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(pattern)).is_err() {
        return date.format("%Y-%m-%d").to_string();
    }
    out
}

/// Localized date for display; unparseable input is returned as-is.
pub fn display_date(input: &str, pattern: &str) -> String {
    match parse_date(input) {
        Some(d) => format_date(d, pattern),
        None => input.to_string(),
    }
}
