use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use polyfeed_core::{publish_entry, PublishPayload, Published};

use crate::error::ApiResult;
use crate::state::AppState;

/// Editor-facing write routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/publish", post(publish))
}

/// Publish a new entry. Responds with the entry and the view paths that are
/// now stale. Unreadable bodies get the same error shape as every other failure.
async fn publish(
    State(state): State<AppState>,
    payload: Result<Json<PublishPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Published>)> {
    let Json(payload) = payload?;
    let published = publish_entry(state.store(), state.event_bus(), payload).await?;
    Ok((StatusCode::CREATED, Json(published)))
}
