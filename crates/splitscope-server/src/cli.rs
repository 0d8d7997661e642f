//! Command line interface and input-path resolution.

use std::path::PathBuf;

use clap::Parser;
use splitscope_core::StoreConfig;
use tracing::debug;

pub const DEFAULT_LIVESPLIT_URL: &str = "http://127.0.0.1:5555/status";

#[derive(Parser, Debug, Default)]
#[command(
    name = "splitscope-server",
    about = "Speedrun analytics dashboard API",
    version
)]
pub struct Cli {
    /// Port for the HTTP API
    #[arg(long, default_value_t = 3000)]
    pub port: u16,

    /// Base directory of the collector layout: contains data/matches.json,
    /// log.txt and screenshots_cache/. When omitted, the current directory
    /// is probed first, then its parent.
    #[arg(long)]
    pub base_dir: Option<PathBuf>,

    /// Detections JSON file (overrides the base-dir layout)
    #[arg(long)]
    pub detections_file: Option<PathBuf>,

    /// Collector log file (overrides the base-dir layout)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Screenshot cache directory (overrides the base-dir layout)
    #[arg(long)]
    pub screenshots_dir: Option<PathBuf>,

    /// LiveSplit status endpoint to proxy
    #[arg(long, default_value = DEFAULT_LIVESPLIT_URL)]
    pub livesplit_url: String,
}

impl Cli {
    /// Resolve the input locations once at startup. Everything downstream
    /// receives explicit paths; no per-request path guessing.
    pub fn resolve_layout(&self) -> StoreConfig {
        let base = self.base_dir.clone().unwrap_or_else(probe_base_dir);
        StoreConfig {
            detections_file: self
                .detections_file
                .clone()
                .unwrap_or_else(|| base.join("data").join("matches.json")),
            log_file: self.log_file.clone().unwrap_or_else(|| base.join("log.txt")),
            screenshots_dir: self
                .screenshots_dir
                .clone()
                .unwrap_or_else(|| base.join("screenshots_cache")),
        }
    }
}

/// Probe the two candidate base directories the collector tooling has been
/// run from (working directory, then its parent). The first containing a
/// detections file wins; the primary is kept otherwise so later read errors
/// report a stable path.
fn probe_base_dir() -> PathBuf {
    let primary = PathBuf::from(".");
    let alternate = PathBuf::from("..");
    for candidate in [&primary, &alternate] {
        if candidate.join("data").join("matches.json").exists() {
            debug!("resolved base dir: {}", candidate.display());
            return candidate.clone();
        }
    }
    primary
}
