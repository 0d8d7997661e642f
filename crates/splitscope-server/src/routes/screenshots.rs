//! Screenshot endpoints.
//!
//! `GET /api/screenshots`        — directory listing, newest first.
//! `GET /api/screenshots/{name}` — raw PNG bytes; the name is validated
//! before any filesystem access.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use splitscope_core::{screenshots, Screenshot};
use tracing::warn;

use crate::state::SharedState;

/// Screenshots change name, never content, so the browser may cache them
/// forever.
const CACHE_FOREVER: &str = "public, max-age=31536000, immutable";

pub async fn list_screenshots(State(state): State<SharedState>) -> Json<Vec<Screenshot>> {
    Json(state.screenshots_or_empty().sorted_by_mtime_desc())
}

pub async fn get_screenshot(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Response {
    if !screenshots::is_valid_name(&name) {
        return (StatusCode::BAD_REQUEST, "Bad Request").into_response();
    }

    let path = state.store.screenshot_file(&name);
    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "image/png"),
                (header::CACHE_CONTROL, CACHE_FOREVER),
            ],
            bytes,
        )
            .into_response(),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            (StatusCode::NOT_FOUND, "Not Found").into_response()
        }
        Err(err) => {
            warn!("failed to read screenshot {}: {err}", path.display());
            (StatusCode::INTERNAL_SERVER_ERROR, "Server Error").into_response()
        }
    }
}
