//! `GET /api/segments` — per-run segments and cross-run marker statistics.

use axum::extract::State;
use axum::Json;
use splitscope_core::{compute_report, SegmentsReport};

use crate::state::SharedState;

pub async fn get_segments(State(state): State<SharedState>) -> Json<SegmentsReport> {
    let detections = state.detections_or_empty();
    Json(compute_report(&detections))
}
