//! `GET /api/data` — the detections file, passed through verbatim.

use axum::extract::State;
use axum::Json;
use serde_json::Value;
use tracing::warn;

use crate::state::SharedState;

pub async fn get_data(State(state): State<SharedState>) -> Json<Value> {
    match state.store.detections_raw() {
        Ok(value) => Json(value),
        Err(err) => {
            warn!("serving empty data: {err}");
            Json(Value::Array(Vec::new()))
        }
    }
}
