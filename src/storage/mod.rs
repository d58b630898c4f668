//! Storage abstraction layer
//!
//! Album persistence behind a single trait, backed by MySQL in production and
//! by an in-process table for tests and local runs.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::DatabaseRuntime;
use crate::types::{Album, AlbumId, NewAlbum};
use crate::Result;

pub mod memory;
pub mod mysql;

/// Album store trait
///
/// Each operation maps to exactly one statement against the store. Errors are
/// never retried by callers.
#[async_trait]
pub trait AlbumStore: Send + Sync {
    /// Look up a single album. `id` is passed through to the store as given;
    /// `Ok(None)` means no row matched.
    async fn get_album(&self, id: &str) -> Result<Option<Album>>;

    /// Insert a new album and return the id the store assigned to it
    async fn create_album(&self, album: &NewAlbum) -> Result<AlbumId>;

    /// Release pooled connections before shutdown
    async fn close(&self) {}
}

/// Storage configuration
#[derive(Debug, Clone)]
pub enum StoreConfig {
    MySql(DatabaseRuntime),
    Memory,
}

/// Create album store from config
///
/// For MySQL this connects the pool and creates the `album` table if absent,
/// so any error here should abort startup.
pub async fn create_store(config: StoreConfig) -> Result<Arc<dyn AlbumStore>> {
    match config {
        StoreConfig::MySql(runtime) => {
            let store = mysql::MySqlStore::connect(&runtime).await?;
            store.ensure_schema().await?;
            Ok(Arc::new(store))
        }
        StoreConfig::Memory => Ok(Arc::new(memory::MemoryStore::new())),
    }
}
