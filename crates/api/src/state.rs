use std::sync::Arc;

use polyfeed_core::events::EventBus;
use polyfeed_core::ContentStore;

/// Shared application state, passed to all handlers via Axum's `State` extractor.
/// Wrapped in `Arc` so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    store: ContentStore,
    event_bus: EventBus,
}

impl AppState {
    pub fn new(store: ContentStore, event_bus: EventBus) -> Self {
        Self {
            inner: Arc::new(InnerState {
                store,
                event_bus,
            }),
        }
    }

    pub fn store(&self) -> &ContentStore {
        &self.inner.store
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.inner.event_bus
    }
}
