//! HTTP server layer for the tile inventory.
//!
//! Translates requests into [`InventoryService`](crate::inventory::InventoryService)
//! calls and maps results and errors to JSON responses.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │        POST/GET /tiles   GET/PUT/DELETE /tiles/{id}             │
//! │                                                                 │
//! │  ┌──────────────────────────┐  ┌─────────────────────────────┐  │
//! │  │        handlers          │  │          routes             │  │
//! │  │ (decode, status mapping) │  │  (router, CORS, tracing)    │  │
//! │  └──────────────────────────┘  └─────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    adjust_stock_handler, create_tile_handler, delete_tile_handler, get_tile_handler,
    health_handler, list_tiles_handler, update_tile_handler, AppState, DeleteResponse,
    ErrorResponse, HealthResponse,
};
pub use routes::{create_default_router, create_router, router_with_state, RouterConfig};
