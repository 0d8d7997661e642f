//! `GET /api/collector-logs` — the most recent parsed collector log
//! entries, match lines correlated with persisted detections.

use axum::extract::State;
use axum::Json;
use splitscope_core::LogEntry;
use tracing::warn;

use crate::state::SharedState;

pub async fn get_collector_logs(State(state): State<SharedState>) -> Json<Vec<LogEntry>> {
    let raw = match state.store.collector_log() {
        Ok(raw) => raw,
        Err(err) => {
            warn!("serving empty collector logs: {err}");
            return Json(Vec::new());
        }
    };
    // A failed detections read only disables correlation; the log entries
    // themselves are still served.
    let detections = state.detections_or_empty();
    Json(state.log_parser.parse(&raw, &detections))
}
