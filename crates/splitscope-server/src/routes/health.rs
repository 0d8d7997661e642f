//! `GET /health` — input visibility diagnostic.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub detections_file: String,
    pub detections_readable: bool,
    pub screenshots_dir: String,
    pub screenshot_count: usize,
}

pub async fn get_health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let config = state.store.config();
    let detections_readable = state.store.detections().is_ok();
    let screenshot_count = state
        .store
        .screenshots()
        .map(|index| index.entries().len())
        .unwrap_or(0);

    Json(HealthResponse {
        status: "ok",
        detections_file: config.detections_file.display().to_string(),
        detections_readable,
        screenshots_dir: config.screenshots_dir.display().to_string(),
        screenshot_count,
    })
}
