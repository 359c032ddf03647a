use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

/// Feeds are public and the editor posts JSON from any origin.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}
