mod config;
mod error;
mod invalidation;
mod middleware;
mod routes;
mod state;

use polyfeed_core::events::EventBus;
use polyfeed_core::{open_backend, ContentStore};
use tower::ServiceBuilder;
use tower_http::map_response_body::MapResponseBodyLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience)
    let _ = dotenvy::dotenv();

    let config = config::AppConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load config: {e}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    tracing::info!("Starting polyfeed API server");

    // Backend is chosen once here and shared by every request.
    let backend = open_backend(&config.backend)
        .map_err(|e| anyhow::anyhow!("Failed to open storage backend: {e}"))?;
    let store = ContentStore::new(backend);

    let event_bus = EventBus::new(config.event_bus_capacity);
    let _invalidations = invalidation::spawn_invalidation_logger(&event_bus);

    let state = state::AppState::new(store, event_bus);

    let app = routes::build_router(state).layer(
        ServiceBuilder::new()
            .layer(middleware::request_tracing::trace_layer())
            .layer(middleware::cors::cors_layer())
            .layer(MapResponseBodyLayer::new(axum::body::Body::new))
            .layer(middleware::body_limit::body_limit_layer(config.max_body_bytes)),
    );

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { tracing::info!("Received Ctrl+C, shutting down..."); }
        _ = terminate => { tracing::info!("Received SIGTERM, shutting down..."); }
    }
}
