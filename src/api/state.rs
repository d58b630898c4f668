//! API server state

use std::sync::Arc;

use crate::storage::memory::MemoryStore;
use crate::storage::AlbumStore;

/// API server state
#[derive(Clone)]
pub struct AppState {
    /// Album store, shared by every request
    pub store: Arc<dyn AlbumStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn AlbumStore>) -> Self {
        Self { store }
    }

    /// State backed by a fresh in-memory table
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }
}
