//! Screenshot index — metadata for the collector's screenshot cache
//! directory, plus the nearest-mtime matcher used when a detection carries
//! no explicit `screenshot_path`.

use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

/// Maximum wall-clock distance for a nearest-mtime match.
pub const NEAREST_TOLERANCE_MS: i64 = 5_000;

lazy_static! {
    static ref SAFE_NAME_RE: Regex = Regex::new(r"^(?i)[A-Za-z0-9_.-]+\.png$").unwrap();
}

/// Whether a requested screenshot filename is allowed to touch the
/// filesystem. Rejects anything with path separators or a non-PNG suffix.
pub fn is_valid_name(name: &str) -> bool {
    SAFE_NAME_RE.is_match(name)
}

/// One image file in the cache directory. The filesystem owns these; we
/// only ever read metadata.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Screenshot {
    pub name: String,
    /// Last-modified time in milliseconds since epoch.
    pub mtime: i64,
    pub size: u64,
}

/// Directory listing of `.png` files, in directory iteration order.
#[derive(Debug, Clone, Default)]
pub struct ScreenshotIndex {
    entries: Vec<Screenshot>,
}

impl ScreenshotIndex {
    pub fn from_entries(entries: Vec<Screenshot>) -> Self {
        Self { entries }
    }

    /// List the `.png` files (case-insensitive suffix) in `dir`. Entries
    /// whose metadata cannot be read are skipped rather than failing the
    /// whole listing; a missing or unreadable directory is the caller's
    /// error to degrade from.
    pub fn read_dir(dir: &Path) -> io::Result<Self> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.to_ascii_lowercase().ends_with(".png") {
                continue;
            }
            let Ok(meta) = entry.metadata() else {
                debug!("skipping {name}: metadata unreadable");
                continue;
            };
            let mtime = meta
                .modified()
                .ok()
                .and_then(system_time_ms)
                .unwrap_or_default();
            entries.push(Screenshot {
                name,
                mtime,
                size: meta.len(),
            });
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[Screenshot] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Listing for the screenshots endpoint: newest first.
    pub fn sorted_by_mtime_desc(&self) -> Vec<Screenshot> {
        let mut out = self.entries.clone();
        out.sort_by(|a, b| b.mtime.cmp(&a.mtime));
        out
    }

    /// The screenshot whose mtime is closest to `wall_clock_ms`, provided
    /// the distance is under [`NEAREST_TOLERANCE_MS`]. Ties keep the first
    /// entry encountered in iteration order. Heuristic correlation only —
    /// used as a fallback when a detection has no stored path.
    pub fn closest_to(&self, wall_clock_ms: i64) -> Option<&Screenshot> {
        let mut best: Option<(&Screenshot, i64)> = None;
        for shot in &self.entries {
            let diff = (wall_clock_ms - shot.mtime).abs();
            if best.map_or(true, |(_, d)| diff < d) {
                best = Some((shot, diff));
            }
        }
        best.filter(|(_, diff)| *diff < NEAREST_TOLERANCE_MS)
            .map(|(shot, _)| shot)
    }
}

fn system_time_ms(t: SystemTime) -> Option<i64> {
    t.duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_millis() as i64)
}
