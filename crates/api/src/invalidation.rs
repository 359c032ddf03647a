use polyfeed_core::events::{ContentEvent, EventBus};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// Log every view a publish made stale. Runs until the bus is dropped and
/// yields the number of publish events it handled.
pub fn spawn_invalidation_logger(bus: &EventBus) -> JoinHandle<u64> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        let mut handled = 0;
        loop {
            match rx.recv().await {
                Ok(ContentEvent::Published(event)) => {
                    handled += 1;
                    for path in &event.invalidate {
                        tracing::info!(path = %path, slug = %event.entry.slug, "Revalidate view");
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Invalidation logger fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
        handled
    })
}
