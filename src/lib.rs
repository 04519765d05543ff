//! # Tile Inventory
//!
//! An HTTP service tracking a stock of tiles. Each tile has an identifier, a
//! name and a stock count, and is exposed through create/read/update/delete
//! endpoints backed by an interchangeable storage backend.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`tile`] - The `Tile` record and request payloads
//! - [`store`] - The `TileStore` trait with memory, SQLite and document backends
//! - [`inventory`] - The inventory service with its write-through cache
//! - [`server`] - Axum-based HTTP handlers and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use tile_inventory::{create_router, InventoryService, MemoryTileStore, RouterConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = InventoryService::new(MemoryTileStore::new());
//!     let router = create_router(service, RouterConfig::new());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod inventory;
pub mod server;
pub mod store;
pub mod tile;

// Re-export commonly used types
pub use config::Config;
pub use error::{StoreError, TileError};
pub use inventory::{InventoryService, DEFAULT_STORAGE_TIMEOUT};
pub use server::{
    create_default_router, create_router, router_with_state, AppState, DeleteResponse,
    ErrorResponse, HealthResponse, RouterConfig,
};
pub use store::{
    DocumentTileStore, MemoryTileStore, ObjectId, SqliteTileStore, StoreKind, TileStore,
};
pub use tile::{NewTile, Tile};
