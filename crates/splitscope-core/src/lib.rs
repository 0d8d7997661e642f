//! splitscope core — correlation and aggregation logic for the speedrun
//! analytics dashboard.
//!
//! The external collector owns all persistent state (a JSON array of
//! template-match detections, a plain-text event log, and a directory of
//! screenshot PNGs). This crate reads those inputs and derives runs,
//! segments, and cross-run statistics; nothing here writes to disk.

pub mod collector_log;
pub mod detection;
pub mod runs;
pub mod screenshots;
pub mod segments;
pub mod store;
pub mod timestamp;

pub use collector_log::{CollectorLogParser, LogEntry, LogEntryKind, MatchDetails};
pub use detection::{Coordinates, Detection, UNASSIGNED_RUN_ID};
pub use runs::{group_runs, run_detail, DetailSegment, EnrichedMatch, RunDetail, RunSummary};
pub use screenshots::{Screenshot, ScreenshotIndex};
pub use segments::{compute_report, RunSegment, RunSegments, SegmentStat, SegmentsReport};
pub use store::{DetectionStore, StoreConfig, StoreError};
pub use timestamp::{format_livesplit, parse_livesplit, parse_wall_clock_ms};
