//! Run endpoints.
//!
//! `GET /api/runs`         — run summaries, newest attempt first.
//! `GET /api/runs/{id}`    — enriched detail view of one run.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use splitscope_core::{compute_report, group_runs, run_detail, RunSummary};

use crate::state::SharedState;

pub async fn list_runs(State(state): State<SharedState>) -> Json<Vec<RunSummary>> {
    let detections = state.detections_or_empty();
    let screenshots = state.screenshots_or_empty();
    Json(group_runs(&detections, &screenshots))
}

/// Non-integer ids are a client error; an id with no qualifying detections
/// is not found.
pub async fn get_run(
    State(state): State<SharedState>,
    Path(run_id): Path<String>,
) -> Response {
    let Ok(run_id) = run_id.parse::<i64>() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid run ID" })),
        )
            .into_response();
    };

    let detections = state.detections_or_empty();
    let screenshots = state.screenshots_or_empty();
    let stats = compute_report(&detections).segment_statistics;

    match run_detail(&detections, run_id, &screenshots, &stats) {
        Some(detail) => Json(detail).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Run not found" })),
        )
            .into_response(),
    }
}
