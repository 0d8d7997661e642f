//! Timestamp parsing — LiveSplit duration strings and collector wall-clock
//! timestamps.
//!
//! LiveSplit exposes its current split time as `HH:MM:SS[.fff]` (comma also
//! accepted as the fraction separator). Anything that does not match the
//! pattern after trimming parses to `None`; downstream computations treat
//! `None` as "exclude from time-ordered views".

use chrono::{DateTime, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LIVESPLIT_RE: Regex =
        Regex::new(r"^(\d{2}):(\d{2}):(\d{2})(?:[.,](\d+))?$").unwrap();
}

/// Parse a LiveSplit `HH:MM:SS[.fff]` duration into seconds.
///
/// The fraction digits are read as the literal decimal fraction
/// `0.<digits>`, whatever their count. Malformed input yields `None`,
/// never an error.
pub fn parse_livesplit(value: &str) -> Option<f64> {
    let caps = LIVESPLIT_RE.captures(value.trim())?;
    let hours: f64 = caps[1].parse().ok()?;
    let minutes: f64 = caps[2].parse().ok()?;
    let seconds: f64 = caps[3].parse().ok()?;
    let frac = caps
        .get(4)
        .and_then(|d| format!("0.{}", d.as_str()).parse::<f64>().ok())
        .unwrap_or(0.0);
    Some(hours * 3600.0 + minutes * 60.0 + seconds + frac)
}

/// Convenience wrapper for the optional field on a detection.
pub fn parse_livesplit_opt(value: Option<&str>) -> Option<f64> {
    value.and_then(parse_livesplit)
}

/// Inverse of [`parse_livesplit`] for display labels. Sub-second fraction is
/// dropped, so `parse` then `format` round-trips any valid `HH:MM:SS`.
pub fn format_livesplit(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Parse a collector wall-clock timestamp into milliseconds since epoch.
///
/// The collector writes naive `YYYY-MM-DD HH:MM:SS` strings into
/// `matches.json` and appends a zone abbreviation (e.g. `CEST`) in log
/// lines. Both sides use the same local convention, so naive values are
/// interpreted as UTC — absolute differences between them stay correct,
/// which is all the correlation logic needs. RFC 3339 input is also
/// accepted.
pub fn parse_wall_clock_ms(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.timestamp_millis());
    }

    // Strip a trailing alphabetic zone abbreviation if present.
    let naive_part = match trimmed.rsplit_once(' ') {
        Some((head, tail)) if !tail.is_empty() && tail.chars().all(|c| c.is_ascii_alphabetic()) => {
            head
        }
        _ => trimmed,
    };

    NaiveDateTime::parse_from_str(naive_part, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().timestamp_millis())
}
