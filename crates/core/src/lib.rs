//! Content store for a small multilingual publishing service.
//!
//! One JSON document holds an append-only entry list per language. It is
//! persisted through a [`storage::StorageBackend`] (local file or remote blob)
//! and accessed through [`store::ContentStore`].

pub mod entry;
pub mod events;
pub mod publish;
pub mod storage;
pub mod store;

pub use entry::{ContentDocument, ContentEntry, Language, NewEntry, Slug};
pub use publish::{publish_entry, PublishError, PublishPayload, Published};
pub use storage::{open_backend, BackendConfig, StorageBackend, StoreError};
pub use store::{ContentStore, StoreScope};
