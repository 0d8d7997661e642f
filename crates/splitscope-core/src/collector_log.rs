//! Collector log correlator — parses the collector's free-text event log
//! and cross-references match lines against the persisted detections.
//!
//! Line format: `[<timestamp>] <message>`. Match messages look like
//! `Match: checkpoint/1.png at (3462, 300) with 94.42%`.

use regex::Regex;
use serde::Serialize;

use crate::detection::Detection;
use crate::timestamp;

/// Wall-clock window for correlating a log line with a persisted detection.
pub const CORRELATION_WINDOW_MS: i64 = 10_000;

/// Only the most recent entries are served.
pub const MAX_ENTRIES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogEntryKind {
    Match,
    Info,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MatchDetails {
    pub template: String,
    pub x: i64,
    pub y: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: LogEntryKind,
    pub details: Option<MatchDetails>,
    pub screenshot_path: Option<String>,
}

/// Parser with its patterns compiled once.
#[derive(Debug)]
pub struct CollectorLogParser {
    line: Regex,
    match_message: Regex,
}

impl Default for CollectorLogParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectorLogParser {
    pub fn new() -> Self {
        Self {
            line: Regex::new(r"^\[(.+?)\] (.+)$").unwrap(),
            match_message: Regex::new(r"Match: (.+?) at \((\d+), (\d+)\) with ([\d.]+)%").unwrap(),
        }
    }

    /// Parse raw log text into structured entries, newest-last, capped at
    /// the most recent [`MAX_ENTRIES`]. Lines that do not fit the
    /// `[timestamp] message` shape are dropped.
    pub fn parse(&self, raw: &str, detections: &[Detection]) -> Vec<LogEntry> {
        let mut entries: Vec<LogEntry> = raw
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| self.parse_line(line, detections))
            .collect();
        let excess = entries.len().saturating_sub(MAX_ENTRIES);
        entries.drain(..excess);
        entries
    }

    fn parse_line(&self, line: &str, detections: &[Detection]) -> Option<LogEntry> {
        let caps = self.line.captures(line)?;
        let timestamp = caps[1].to_string();
        let message = caps[2].to_string();

        let Some(m) = self.match_message.captures(&message) else {
            return Some(LogEntry {
                timestamp,
                message,
                kind: LogEntryKind::Info,
                details: None,
                screenshot_path: None,
            });
        };

        let details = MatchDetails {
            template: m[1].to_string(),
            x: m[2].parse().ok()?,
            y: m[3].parse().ok()?,
            percentage: m[4].parse().ok()?,
        };
        let screenshot_path = correlate(&timestamp, &details, detections);
        Some(LogEntry {
            timestamp,
            message,
            kind: LogEntryKind::Match,
            details: Some(details),
            screenshot_path,
        })
    }
}

/// Find the persisted detection for a match-typed log line: coordinates
/// must be equal exactly and the wall-clock difference under
/// [`CORRELATION_WINDOW_MS`].
///
/// When several detections satisfy the window, the first in file order wins
/// and its (possibly absent) `screenshot_path` is the answer — the search
/// does not continue to a later candidate that does carry a path. The
/// detections file is append-ordered by the collector, so "first" means
/// "oldest".
fn correlate(timestamp: &str, details: &MatchDetails, detections: &[Detection]) -> Option<String> {
    let log_ms = timestamp::parse_wall_clock_ms(timestamp)?;
    detections
        .iter()
        .find(|det| {
            det.coordinates.x == details.x
                && det.coordinates.y == details.y
                && det
                    .wall_clock_ms()
                    .map_or(false, |ms| (ms - log_ms).abs() < CORRELATION_WINDOW_MS)
        })
        .and_then(|det| det.screenshot_path.clone())
}
