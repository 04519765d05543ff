//! Inventory Service for orchestrating tile operations.
//!
//! The InventoryService is the entry point for every tile operation. It:
//! - Validates identifiers against the configured backend
//! - Serializes mutations behind a single lock
//! - Bounds every storage call with a timeout
//! - Keeps an optional write-through cache in step with the store
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      InventoryService                       │
//! │  ┌───────────────┐   ┌──────────────┐   ┌────────────────┐  │
//! │  │  write lock   │   │    cache     │   │    timeout     │  │
//! │  │ (mutations)   │   │ (id → Tile)  │   │ (per call)     │  │
//! │  └───────────────┘   └──────────────┘   └────────────────┘  │
//! └──────────────────────────────┬──────────────────────────────┘
//!                                │
//!                                ▼
//!                     ┌─────────────────────┐
//!                     │   TileStore trait   │
//!                     └─────────────────────┘
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::error::{StoreError, TileError};
use crate::store::{StoreKind, TileStore};
use crate::tile::{sort_by_id, NewTile, Tile};

/// Default bound on a single storage call.
pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Service implementing the inventory operations over a [`TileStore`].
///
/// The cache, when enabled, mirrors the store: every successful mutation is
/// written to the store first and then applied to the cache, with both steps
/// under the write lock. The store remains authoritative.
///
/// A mutation that times out or loses the backend may still land in the
/// store after the caller has been answered. Such a failure marks the cache
/// stale, and it is rebuilt from the store before it is read again.
///
/// # Example
///
/// ```
/// use tile_inventory::inventory::InventoryService;
/// use tile_inventory::store::MemoryTileStore;
/// use tile_inventory::tile::NewTile;
///
/// #[tokio::main]
/// async fn main() {
///     let service = InventoryService::new(MemoryTileStore::new());
///
///     let tile = service.create_tile(NewTile::new("Kajaria", 10)).await.unwrap();
///     assert_eq!(tile.id, "1");
///
///     let tile = service.adjust_stock(&tile.id, 5).await.unwrap();
///     assert_eq!(tile.stock, 15);
/// }
/// ```
pub struct InventoryService<S: TileStore> {
    /// The storage backend
    store: S,

    /// Write-through cache (None when the backend is used directly)
    cache: Option<RwLock<HashMap<String, Tile>>>,

    /// Serializes create/update/adjust/delete
    write_lock: Mutex<()>,

    /// Set when a mutation's outcome in the store is unknown
    stale: AtomicBool,

    /// Bound on each storage call
    timeout: Duration,
}

impl<S: TileStore> InventoryService<S> {
    /// Create a service using the backend's default caching policy.
    pub fn new(store: S) -> Self {
        let cached = store.kind().uses_cache();
        Self::with_cache(store, cached)
    }

    /// Create a service with the cache explicitly enabled or disabled.
    pub fn with_cache(store: S, cached: bool) -> Self {
        Self {
            store,
            cache: cached.then(|| RwLock::new(HashMap::new())),
            write_lock: Mutex::new(()),
            stale: AtomicBool::new(false),
            timeout: DEFAULT_STORAGE_TIMEOUT,
        }
    }

    /// Set the per-call storage timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_kind(&self) -> StoreKind {
        self.store.kind()
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache.is_some()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Check that the backend answers a listing. Returns the number of tiles.
    pub async fn check_storage(&self) -> Result<usize, TileError> {
        let tiles = self.call("list", self.store.list()).await?;
        Ok(tiles.len())
    }

    /// Load every stored tile into the cache.
    ///
    /// Returns the number of cached tiles, or 0 when caching is disabled.
    pub async fn warm(&self) -> Result<usize, TileError> {
        let Some(cache) = &self.cache else {
            return Ok(0);
        };

        let _guard = self.write_lock.lock().await;
        let count = self.reload_cache(cache).await?;
        info!(tiles = count, "Warmed tile cache");
        Ok(count)
    }

    /// Create a tile. The backend assigns the identifier.
    pub async fn create_tile(&self, new: NewTile) -> Result<Tile, TileError> {
        let _guard = self.write_lock.lock().await;
        self.resync_locked().await?;
        let tile = self.mutate("create", self.store.create(new)).await?;

        if let Some(cache) = &self.cache {
            cache.write().await.insert(tile.id.clone(), tile.clone());
        }

        info!(id = %tile.id, name = %tile.name, stock = tile.stock, "Created tile");
        Ok(tile)
    }

    /// List all tiles ordered by identifier.
    pub async fn list_tiles(&self) -> Result<Vec<Tile>, TileError> {
        let mut tiles = match &self.cache {
            Some(cache) => {
                self.resync().await?;
                cache.read().await.values().cloned().collect()
            }
            None => self.call("list", self.store.list()).await?,
        };
        sort_by_id(&mut tiles);
        Ok(tiles)
    }

    /// Fetch a single tile.
    pub async fn get_tile(&self, id: &str) -> Result<Tile, TileError> {
        self.store.validate_id(id)?;

        if let Some(cache) = &self.cache {
            self.resync().await?;
            if let Some(tile) = cache.read().await.get(id) {
                debug!(id = %id, "Tile cache hit");
                return Ok(tile.clone());
            }
        }

        let Some(cache) = &self.cache else {
            return self.call("get", self.store.get(id)).await;
        };

        // Fill under the write lock so a concurrent delete cannot be undone
        let _guard = self.write_lock.lock().await;
        let tile = self.call("get", self.store.get(id)).await?;
        cache.write().await.insert(tile.id.clone(), tile.clone());
        Ok(tile)
    }

    /// Replace the name and stock of an existing tile.
    pub async fn update_tile(&self, id: &str, new: NewTile) -> Result<Tile, TileError> {
        self.store.validate_id(id)?;

        let _guard = self.write_lock.lock().await;
        self.resync_locked().await?;
        let tile = self.mutate("update", self.store.update(id, new)).await?;

        if let Some(cache) = &self.cache {
            cache.write().await.insert(tile.id.clone(), tile.clone());
        }

        info!(id = %tile.id, stock = tile.stock, "Replaced tile");
        Ok(tile)
    }

    /// Apply a signed delta to a tile's stock.
    ///
    /// With the cache enabled, a tile absent from the cache is `NotFound`.
    /// The resulting stock may be negative.
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> Result<Tile, TileError> {
        self.store.validate_id(id)?;

        let _guard = self.write_lock.lock().await;
        self.resync_locked().await?;
        let current = match &self.cache {
            Some(cache) => cache
                .read()
                .await
                .get(id)
                .cloned()
                .ok_or_else(|| TileError::NotFound { id: id.to_string() })?,
            None => self.call("get", self.store.get(id)).await?,
        };

        let adjusted = current.adjusted(delta)?;
        let update = NewTile::new(adjusted.name, adjusted.stock);
        let tile = self.mutate("update", self.store.update(id, update)).await?;

        if let Some(cache) = &self.cache {
            cache.write().await.insert(tile.id.clone(), tile.clone());
        }

        info!(id = %tile.id, delta, stock = tile.stock, "Adjusted stock");
        Ok(tile)
    }

    /// Delete a tile from the store and the cache.
    pub async fn delete_tile(&self, id: &str) -> Result<(), TileError> {
        self.store.validate_id(id)?;

        let _guard = self.write_lock.lock().await;
        self.resync_locked().await?;
        let result = self.mutate("delete", self.store.delete(id)).await;

        // A NotFound from the store also means any cached copy is stale
        if let Some(cache) = &self.cache {
            if matches!(result, Ok(()) | Err(TileError::NotFound { .. })) {
                cache.write().await.remove(id);
            }
        }
        result?;

        info!(id = %id, "Deleted tile");
        Ok(())
    }

    /// Rebuild a stale cache, taking the write lock.
    async fn resync(&self) -> Result<(), TileError> {
        if !self.stale.load(Ordering::Acquire) {
            return Ok(());
        }
        let _guard = self.write_lock.lock().await;
        self.resync_locked().await
    }

    /// Rebuild a stale cache. The caller holds the write lock.
    async fn resync_locked(&self) -> Result<(), TileError> {
        let Some(cache) = &self.cache else {
            return Ok(());
        };
        if !self.stale.load(Ordering::Acquire) {
            return Ok(());
        }
        let count = self.reload_cache(cache).await?;
        info!(tiles = count, "Rebuilt stale tile cache");
        Ok(())
    }

    /// Replace the cache contents with a fresh listing and clear the stale
    /// mark. The caller holds the write lock.
    async fn reload_cache(
        &self,
        cache: &RwLock<HashMap<String, Tile>>,
    ) -> Result<usize, TileError> {
        let tiles = self.call("list", self.store.list()).await?;
        let mut cache = cache.write().await;
        cache.clear();
        cache.extend(tiles.into_iter().map(|t| (t.id.clone(), t)));
        self.stale.store(false, Ordering::Release);
        Ok(cache.len())
    }

    /// Run a mutating storage call. A timeout or backend failure leaves the
    /// store state unknown, so the cache is marked stale.
    async fn mutate<T, F>(&self, operation: &'static str, fut: F) -> Result<T, TileError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        let result = self.call(operation, fut).await;
        if self.cache.is_some()
            && matches!(
                result,
                Err(TileError::Timeout { .. } | TileError::StorageUnavailable { .. })
            )
        {
            warn!(operation, "Mutation outcome unknown, marking tile cache stale");
            self.stale.store(true, Ordering::Release);
        }
        result
    }

    /// Run a storage call under the configured timeout.
    async fn call<T, F>(&self, operation: &'static str, fut: F) -> Result<T, TileError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(TileError::from),
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Storage call timed out"
                );
                Err(TileError::Timeout {
                    operation,
                    timeout_ms: self.timeout.as_millis() as u64,
                })
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
