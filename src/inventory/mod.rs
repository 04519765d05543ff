//! Inventory service layer.
//!
//! [`InventoryService`] exposes the tile operations independently of HTTP:
//! create, list, get, full replace, stock adjustment and delete. It sits
//! between the HTTP handlers and a [`TileStore`](crate::store::TileStore).

mod service;

pub use service::{InventoryService, DEFAULT_STORAGE_TIMEOUT};
