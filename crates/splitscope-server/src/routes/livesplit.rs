//! `GET /api/livesplit` — proxy of the local LiveSplit status endpoint.

use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::state::SharedState;

pub async fn get_livesplit(State(state): State<SharedState>) -> Json<Value> {
    Json(state.livesplit.status().await)
}
