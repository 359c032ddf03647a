pub mod feeds;
pub mod health;
pub mod publish;

use axum::Router;

use crate::state::AppState;

/// Assemble the full router with all route groups.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(feeds::routes())
        .merge(publish::routes())
        .with_state(state)
}
