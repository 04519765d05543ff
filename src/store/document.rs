//! Embedded document-store backend.
//!
//! Tiles are kept as documents in a single collection and identified by
//! store-generated [`ObjectId`]s. The collection is optionally persisted to a
//! JSON file, rewritten atomically after every mutation.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};
use tracing::debug;

use crate::error::StoreError;
use crate::tile::{NewTile, Tile};

use super::{StoreKind, TileStore};

// =============================================================================
// ObjectId
// =============================================================================

/// A 12-byte document identifier, rendered as 24 lowercase hex characters.
///
/// Layout: 4-byte big-endian unix seconds, 5 bytes of per-process
/// randomness, 3-byte wrapping counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    /// Length of the hex form.
    pub const HEX_LEN: usize = 24;

    /// Generate a new identifier.
    pub fn generate() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);
        let count = next_counter();

        let mut bytes = [0u8; 12];
        bytes[0..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(process_unique());
        bytes[9..12].copy_from_slice(&count.to_be_bytes()[1..4]);
        Self(bytes)
    }

    /// Parse the 24-character hex form. Upper-case digits are accepted.
    pub fn parse_str(s: &str) -> Result<Self, StoreError> {
        if s.len() != Self::HEX_LEN {
            return Err(StoreError::InvalidId(s.to_string()));
        }
        let mut bytes = [0u8; 12];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| StoreError::InvalidId(s.to_string()))?;
        Ok(Self(bytes))
    }

    /// Creation time in unix seconds.
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn process_unique() -> &'static [u8; 5] {
    static UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
    UNIQUE.get_or_init(rand::random)
}

fn next_counter() -> u32 {
    static COUNTER: OnceLock<AtomicU32> = OnceLock::new();
    COUNTER
        .get_or_init(|| AtomicU32::new(rand::random::<u32>() & 0x00FF_FFFF))
        .fetch_add(1, Ordering::Relaxed)
        & 0x00FF_FFFF
}

// =============================================================================
// DocumentTileStore
// =============================================================================

/// A stored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct TileDocument {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    stock: i64,
}

impl From<TileDocument> for Tile {
    fn from(doc: TileDocument) -> Self {
        Tile {
            id: doc.id,
            name: doc.name,
            stock: doc.stock,
        }
    }
}

/// Tile store holding a collection of JSON documents.
///
/// Documents are returned in insertion order. When opened with a path, every
/// mutation is written to a temporary file and renamed over the collection
/// file before it becomes visible.
///
/// A commit runs to completion on its own task, so a caller that stops
/// waiting never leaves the file and the live collection apart.
pub struct DocumentTileStore {
    docs: Arc<RwLock<Vec<TileDocument>>>,
    path: Option<PathBuf>,
}

impl DocumentTileStore {
    /// Create an unpersisted collection.
    pub fn in_memory() -> Self {
        Self {
            docs: Arc::new(RwLock::new(Vec::new())),
            path: None,
        }
    }

    /// Open the collection file at `path`, creating it when missing.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let docs = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => parse_collection(&bytes, &path)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                write_collection(&path, &[]).await?;
                Vec::new()
            }
            Err(e) => {
                return Err(StoreError::Unavailable(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        debug!(path = %path.display(), documents = docs.len(), "Opened document collection");

        Ok(Self {
            docs: Arc::new(RwLock::new(docs)),
            path: Some(path),
        })
    }

    /// Location of the collection file, if persisted.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    async fn lock_for_write(&self) -> OwnedRwLockWriteGuard<Vec<TileDocument>> {
        Arc::clone(&self.docs).write_owned().await
    }

    /// Persist `next` and then make it the live collection.
    async fn commit(
        &self,
        mut docs: OwnedRwLockWriteGuard<Vec<TileDocument>>,
        next: Vec<TileDocument>,
    ) -> Result<(), StoreError> {
        let path = self.path.clone();
        tokio::spawn(async move {
            if let Some(path) = &path {
                write_collection(path, &next).await?;
            }
            *docs = next;
            Ok::<(), StoreError>(())
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("document commit failed: {}", e)))?
    }
}

fn parse_collection(bytes: &[u8], path: &Path) -> Result<Vec<TileDocument>, StoreError> {
    let docs: Vec<TileDocument> = serde_json::from_slice(bytes).map_err(|e| {
        StoreError::Unavailable(format!("corrupt collection {}: {}", path.display(), e))
    })?;

    for doc in &docs {
        ObjectId::parse_str(&doc.id).map_err(|_| {
            StoreError::Unavailable(format!(
                "corrupt collection {}: bad document id {:?}",
                path.display(),
                doc.id
            ))
        })?;
    }
    Ok(docs)
}

async fn write_collection(path: &Path, docs: &[TileDocument]) -> Result<(), StoreError> {
    let json = serde_json::to_vec_pretty(docs)
        .map_err(|e| StoreError::Unavailable(format!("failed to encode collection: {}", e)))?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, &json)
        .await
        .map_err(|e| StoreError::Unavailable(format!("failed to write {}: {}", tmp.display(), e)))?;
    tokio::fs::rename(&tmp, path).await.map_err(|e| {
        StoreError::Unavailable(format!("failed to replace {}: {}", path.display(), e))
    })
}

/// Canonical (lowercase) form of a document id.
fn canonical_id(id: &str) -> Result<String, StoreError> {
    ObjectId::parse_str(id).map(|oid| oid.to_hex())
}

#[async_trait]
impl TileStore for DocumentTileStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Document
    }

    fn validate_id(&self, id: &str) -> Result<(), StoreError> {
        ObjectId::parse_str(id).map(|_| ())
    }

    async fn create(&self, tile: NewTile) -> Result<Tile, StoreError> {
        let docs = self.lock_for_write().await;
        let id = ObjectId::generate().to_hex();
        if docs.iter().any(|d| d.id == id) {
            return Err(StoreError::DuplicateKey(id));
        }

        let doc = TileDocument {
            id,
            name: tile.name,
            stock: tile.stock,
        };
        let mut next = docs.clone();
        next.push(doc.clone());
        self.commit(docs, next).await?;

        Ok(doc.into())
    }

    async fn list(&self) -> Result<Vec<Tile>, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs.iter().cloned().map(Tile::from).collect())
    }

    async fn get(&self, id: &str) -> Result<Tile, StoreError> {
        let id = canonical_id(id)?;
        let docs = self.docs.read().await;
        docs.iter()
            .find(|d| d.id == id)
            .cloned()
            .map(Tile::from)
            .ok_or(StoreError::NotFound(id))
    }

    async fn update(&self, id: &str, tile: NewTile) -> Result<Tile, StoreError> {
        let id = canonical_id(id)?;
        let docs = self.lock_for_write().await;
        let pos = docs
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        let mut next = docs.clone();
        next[pos].name = tile.name;
        next[pos].stock = tile.stock;
        let updated = next[pos].clone();
        self.commit(docs, next).await?;

        Ok(updated.into())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let id = canonical_id(id)?;
        let docs = self.lock_for_write().await;
        let pos = docs
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        let mut next = docs.clone();
        next.remove(pos);
        self.commit(docs, next).await
    }
}
