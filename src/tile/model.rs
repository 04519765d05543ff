//! The Tile record and its request payloads.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::TileError;

/// A tile in the inventory.
///
/// Wire format: `{"id": string, "name": string, "stock": integer}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Identifier assigned by the storage backend
    pub id: String,

    /// Free-text name (may be empty)
    pub name: String,

    /// Quantity in stock. Negative values are permitted.
    pub stock: i64,
}

impl Tile {
    /// Create a tile from its parts.
    pub fn new(id: impl Into<String>, name: impl Into<String>, stock: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            stock,
        }
    }

    /// Build the stored record for `id` from a create/replace payload.
    pub fn from_new(id: impl Into<String>, new: NewTile) -> Self {
        Self {
            id: id.into(),
            name: new.name,
            stock: new.stock,
        }
    }

    /// Apply a signed stock delta.
    ///
    /// The result may be negative; only `i64` overflow is rejected.
    pub fn adjusted(&self, delta: i64) -> Result<Tile, TileError> {
        let stock = self
            .stock
            .checked_add(delta)
            .ok_or(TileError::InvalidStock {
                stock: self.stock,
                delta,
            })?;

        Ok(Tile {
            id: self.id.clone(),
            name: self.name.clone(),
            stock,
        })
    }
}

/// Payload for creating or fully replacing a tile.
///
/// Both fields are required. An `id` field in the body is ignored; the
/// identifier always comes from the backend or the request path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTile {
    pub name: String,
    pub stock: i64,
}

impl NewTile {
    pub fn new(name: impl Into<String>, stock: i64) -> Self {
        Self {
            name: name.into(),
            stock,
        }
    }

    /// Decode a request body.
    pub fn from_json(body: &[u8]) -> Result<Self, TileError> {
        Ok(serde_json::from_slice(body)?)
    }
}

/// Decode a bare signed integer stock delta, e.g. `5` or `-3`.
pub fn parse_stock_delta(body: &[u8]) -> Result<i64, TileError> {
    Ok(serde_json::from_slice(body)?)
}

/// Order tile identifiers: shorter first, then lexicographically.
///
/// For decimal identifiers this is numeric order; for fixed-width hex
/// identifiers it is plain lexicographic order.
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Sort tiles in place by [`compare_ids`].
pub fn sort_by_id(tiles: &mut [Tile]) {
    tiles.sort_by(|a, b| compare_ids(&a.id, &b.id));
}
