//! In-process tile store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::tile::{sort_by_id, NewTile, Tile};

use super::{validate_decimal_id, StoreKind, TileStore};

/// Tile store backed by a `HashMap`.
///
/// Identifiers are sequential decimal strings starting at `"1"`. The next
/// identifier is one above the highest stored identifier. Nothing is
/// persisted across restarts.
#[derive(Default)]
pub struct MemoryTileStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    tiles: HashMap<String, Tile>,
}

impl Inner {
    fn next_id(&self) -> Result<u64, StoreError> {
        let highest = self
            .tiles
            .keys()
            .filter_map(|id| id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        highest
            .checked_add(1)
            .ok_or_else(|| StoreError::Unavailable("identifier space exhausted".to_string()))
    }
}

impl MemoryTileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tiles.
    pub async fn len(&self) -> usize {
        self.inner.read().await.tiles.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl TileStore for MemoryTileStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Memory
    }

    fn validate_id(&self, id: &str) -> Result<(), StoreError> {
        validate_decimal_id(id).map(|_| ())
    }

    async fn create(&self, tile: NewTile) -> Result<Tile, StoreError> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id()?.to_string();

        if inner.tiles.contains_key(&id) {
            return Err(StoreError::DuplicateKey(id));
        }

        let tile = Tile::from_new(id.clone(), tile);
        inner.tiles.insert(id, tile.clone());
        Ok(tile)
    }

    async fn list(&self) -> Result<Vec<Tile>, StoreError> {
        let inner = self.inner.read().await;
        let mut tiles: Vec<Tile> = inner.tiles.values().cloned().collect();
        sort_by_id(&mut tiles);
        Ok(tiles)
    }

    async fn get(&self, id: &str) -> Result<Tile, StoreError> {
        validate_decimal_id(id)?;
        self.inner
            .read()
            .await
            .tiles
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn update(&self, id: &str, tile: NewTile) -> Result<Tile, StoreError> {
        validate_decimal_id(id)?;
        let mut inner = self.inner.write().await;
        match inner.tiles.get_mut(id) {
            Some(existing) => {
                existing.name = tile.name;
                existing.stock = tile.stock;
                Ok(existing.clone())
            }
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        validate_decimal_id(id)?;
        self.inner
            .write()
            .await
            .tiles
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}
