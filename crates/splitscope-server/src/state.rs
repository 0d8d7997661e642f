//! Shared application state and router construction.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use splitscope_core::{CollectorLogParser, Detection, DetectionStore, ScreenshotIndex};
use tracing::{info, warn};

use crate::livesplit::LiveSplitProxy;
use crate::routes;

pub struct AppState {
    pub store: DetectionStore,
    pub log_parser: CollectorLogParser,
    pub livesplit: LiveSplitProxy,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(store: DetectionStore, livesplit: LiveSplitProxy) -> Self {
        Self {
            store,
            log_parser: CollectorLogParser::new(),
            livesplit,
        }
    }

    /// Detection list with the degrade-to-empty policy applied: a failed
    /// read is logged and served as no data.
    pub fn detections_or_empty(&self) -> Vec<Detection> {
        match self.store.detections() {
            Ok(detections) => detections,
            Err(err) => {
                warn!("serving empty detections: {err}");
                Vec::new()
            }
        }
    }

    /// Screenshot index with the same policy.
    pub fn screenshots_or_empty(&self) -> ScreenshotIndex {
        match self.store.screenshots() {
            Ok(index) => index,
            Err(err) => {
                warn!("serving empty screenshot index: {err}");
                ScreenshotIndex::default()
            }
        }
    }
}

pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(routes::health::get_health))
        .route("/api/data", get(routes::data::get_data))
        .route("/api/runs", get(routes::runs::list_runs))
        .route("/api/runs/:run_id", get(routes::runs::get_run))
        .route("/api/segments", get(routes::segments::get_segments))
        .route("/api/screenshots", get(routes::screenshots::list_screenshots))
        .route("/api/screenshots/:name", get(routes::screenshots::get_screenshot))
        .route(
            "/api/collector-logs",
            get(routes::collector_logs::get_collector_logs),
        )
        .route("/api/livesplit", get(routes::livesplit::get_livesplit))
        .with_state(state)
}

/// Bind and serve until ctrl-c. The listener is bound before serving so a
/// port conflict surfaces as a startup error instead of dying in the
/// background.
pub async fn serve(state: SharedState, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("splitscope API listening on {addr}");
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to install ctrl-c handler: {err}");
        return;
    }
    info!("shutdown signal received");
}
