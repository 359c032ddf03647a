use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::state::AppState;

/// Health check routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/ping", get(ping))
}

/// Full health check: reads the content document through the backend.
async fn health_check(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let store = state.store();
    let document = store.scope().document().await?;

    Ok(Json(json!({
        "status": "ok",
        "backend": store.backend().kind(),
        "entries": document.len(),
        "subscribers": state.event_bus().subscriber_count(),
    })))
}

/// Lightweight ping, no storage access.
async fn ping() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
