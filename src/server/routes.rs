//! Router configuration for the tile inventory service.
//!
//! This module defines the HTTP routes and applies middleware for CORS and
//! request tracing.
//!
//! # Route Structure
//!
//! ```text
//! /health                - Health check
//! /tiles                 - GET list, POST create
//! /tiles/{id}            - GET fetch, PUT replace, DELETE remove
//! /tiles/{id}/stock      - PUT signed stock delta
//! ```
//!
//! # Example
//!
//! ```ignore
//! use tile_inventory::inventory::InventoryService;
//! use tile_inventory::server::{create_router, RouterConfig};
//! use tile_inventory::store::MemoryTileStore;
//!
//! let service = InventoryService::new(MemoryTileStore::new());
//!
//! let config = RouterConfig::new()
//!     .with_cors_origins(vec!["https://example.com".to_string()]);
//!
//! let router = create_router(service, config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{
    routing::{get, put},
    Router,
};
use http::header::CONTENT_TYPE;
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    adjust_stock_handler, create_tile_handler, delete_tile_handler, get_tile_handler,
    health_handler, list_tiles_handler, update_tile_handler, AppState,
};
use crate::inventory::InventoryService;
use crate::store::TileStore;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Clone, Debug)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a new router configuration.
    ///
    /// By default CORS allows any origin and tracing is enabled.
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            enable_tracing: true,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Allow any CORS origin.
    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// # Arguments
///
/// * `inventory` - The inventory service handling tile requests
/// * `config` - Router configuration
pub fn create_router<S>(inventory: InventoryService<S>, config: RouterConfig) -> Router
where
    S: TileStore + 'static,
{
    router_with_state(AppState::new(inventory), config)
}

/// Create the router around existing application state.
pub fn router_with_state<S>(app_state: AppState<S>, config: RouterConfig) -> Router
where
    S: TileStore + 'static,
{
    let cors = build_cors_layer(&config);

    let router = Router::new()
        .route("/health", get(health_handler::<S>))
        .route(
            "/tiles",
            get(list_tiles_handler::<S>).post(create_tile_handler::<S>),
        )
        .route(
            "/tiles/{id}",
            get(get_tile_handler::<S>)
                .put(update_tile_handler::<S>)
                .delete(delete_tile_handler::<S>),
        )
        .route("/tiles/{id}/stock", put(adjust_stock_handler::<S>))
        .with_state(app_state)
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(86400)); // 24 hours

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Convenience Functions
// =============================================================================

/// Create a router with default configuration.
pub fn create_default_router<S>(inventory: InventoryService<S>) -> Router
where
    S: TileStore + 'static,
{
    create_router(inventory, RouterConfig::default())
}

// =============================================================================
// Tests
// =============================================================================
