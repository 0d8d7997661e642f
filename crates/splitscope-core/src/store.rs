//! Detection store — per-request reads of the externally-owned inputs.
//!
//! The collector process owns all three inputs and appends to them at will;
//! nothing is cached here, so every request sees the latest state. Reads
//! return a typed error instead of swallowing it, letting HTTP call sites
//! log "degraded to empty because X" before returning the empty default.

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::detection::Detection;
use crate::screenshots::ScreenshotIndex;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Resolved input locations, injected once at startup. No runtime
/// path-guessing happens below this point.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// JSON array of detection records (`matches.json`).
    pub detections_file: PathBuf,
    /// Plain-text collector event log (`log.txt`).
    pub log_file: PathBuf,
    /// Directory of screenshot PNGs (`screenshots_cache/`).
    pub screenshots_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct DetectionStore {
    config: StoreConfig,
}

impl DetectionStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Read and decode the full detection list. A mid-write partial file
    /// from the collector shows up as a `Parse` error; callers degrade to
    /// empty and the next request re-reads.
    pub fn detections(&self) -> Result<Vec<Detection>, StoreError> {
        let path = &self.config.detections_file;
        let content = read_file(path)?;
        serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            path: path.clone(),
            source,
        })
    }

    /// The detections file as raw JSON, for the passthrough data endpoint.
    pub fn detections_raw(&self) -> Result<Value, StoreError> {
        let path = &self.config.detections_file;
        let content = read_file(path)?;
        serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            path: path.clone(),
            source,
        })
    }

    /// Raw collector log text.
    pub fn collector_log(&self) -> Result<String, StoreError> {
        read_file(&self.config.log_file)
    }

    /// Current screenshot directory listing.
    pub fn screenshots(&self) -> Result<ScreenshotIndex, StoreError> {
        ScreenshotIndex::read_dir(&self.config.screenshots_dir).map_err(|source| StoreError::Io {
            path: self.config.screenshots_dir.clone(),
            source,
        })
    }

    /// Path of one screenshot by (already validated) filename.
    pub fn screenshot_file(&self, name: &str) -> PathBuf {
        self.config.screenshots_dir.join(name)
    }
}

fn read_file(path: &Path) -> Result<String, StoreError> {
    std::fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}
