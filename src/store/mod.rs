//! Storage backends for tiles.
//!
//! The inventory service talks to persistence only through the [`TileStore`]
//! trait. Three implementations are provided and selected at startup:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            InventoryService             │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │            TileStore Trait              │
//! │  (create, list, get, update, delete)    │
//! └────────────────────┬────────────────────┘
//!                      │
//!        ┌─────────────┼──────────────┐
//!        ▼             ▼              ▼
//! ┌────────────┐ ┌────────────┐ ┌──────────────┐
//! │   Memory   │ │   SQLite   │ │   Document   │
//! │ (HashMap)  │ │ (rusqlite) │ │ (JSON file)  │
//! └────────────┘ └────────────┘ └──────────────┘
//! ```

mod document;
mod memory;
mod sqlite;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use clap::ValueEnum;

use crate::error::StoreError;
use crate::tile::{NewTile, Tile};

pub use document::{DocumentTileStore, ObjectId};
pub use memory::MemoryTileStore;
pub use sqlite::SqliteTileStore;

// =============================================================================
// TileStore Trait
// =============================================================================

/// Persistence contract for tiles.
///
/// Implementations own identifier assignment and must report failures only
/// through [`StoreError`].
#[async_trait]
pub trait TileStore: Send + Sync {
    /// Which backend this is.
    fn kind(&self) -> StoreKind;

    /// Check that `id` is well-formed for this backend.
    ///
    /// Returns [`StoreError::InvalidId`] otherwise.
    fn validate_id(&self, id: &str) -> Result<(), StoreError>;

    /// Persist a new tile and return it with its assigned identifier.
    async fn create(&self, tile: NewTile) -> Result<Tile, StoreError>;

    /// Return all tiles in backend-native order.
    async fn list(&self) -> Result<Vec<Tile>, StoreError>;

    /// Fetch a single tile.
    async fn get(&self, id: &str) -> Result<Tile, StoreError>;

    /// Replace the name and stock of an existing tile and return it as stored.
    async fn update(&self, id: &str, tile: NewTile) -> Result<Tile, StoreError>;

    /// Remove a tile.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: TileStore + ?Sized> TileStore for Arc<T> {
    fn kind(&self) -> StoreKind {
        (**self).kind()
    }

    fn validate_id(&self, id: &str) -> Result<(), StoreError> {
        (**self).validate_id(id)
    }

    async fn create(&self, tile: NewTile) -> Result<Tile, StoreError> {
        (**self).create(tile).await
    }

    async fn list(&self) -> Result<Vec<Tile>, StoreError> {
        (**self).list().await
    }

    async fn get(&self, id: &str) -> Result<Tile, StoreError> {
        (**self).get(id).await
    }

    async fn update(&self, id: &str, tile: NewTile) -> Result<Tile, StoreError> {
        (**self).update(id, tile).await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        (**self).delete(id).await
    }
}

// =============================================================================
// Backend Selection
// =============================================================================

/// The available storage backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// In-process map, lost on exit
    Memory,
    /// Embedded SQLite database
    Sqlite,
    /// Embedded JSON document collection with generated object ids
    Document,
}

impl StoreKind {
    /// Whether the inventory service keeps a write-through cache in front of
    /// this backend by default.
    pub fn uses_cache(self) -> bool {
        match self {
            StoreKind::Memory | StoreKind::Sqlite => true,
            StoreKind::Document => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StoreKind::Memory => "memory",
            StoreKind::Sqlite => "sqlite",
            StoreKind::Document => "document",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check a sequential decimal identifier as used by the memory and SQLite
/// backends.
pub(crate) fn validate_decimal_id(id: &str) -> Result<u64, StoreError> {
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StoreError::InvalidId(id.to_string()));
    }
    id.parse::<u64>()
        .map_err(|_| StoreError::InvalidId(id.to_string()))
}
