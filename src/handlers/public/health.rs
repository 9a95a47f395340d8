use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::app::AppState;

/// GET /health - Liveness of the server, with the configured project
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": now,
            "version": env!("CARGO_PKG_VERSION"),
            "project_configured": !state.api.project_id().is_empty(),
        }
    }))
}
