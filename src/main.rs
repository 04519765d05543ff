//! Tile Inventory - HTTP service for tracking tile stock.
//!
//! This binary opens the configured storage backend and starts the HTTP
//! server.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tile_inventory::{
    config::Config,
    inventory::InventoryService,
    server::{create_router, RouterConfig},
    store::StoreKind,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    // Initialize logging
    init_logging(config.verbose);

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Tile Inventory v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Backend: {}", config.backend);
    match config.backend {
        StoreKind::Sqlite => info!("  SQLite path: {}", config.sqlite_path.display()),
        StoreKind::Document => info!("  Document path: {}", config.document_path.display()),
        StoreKind::Memory => warn!("  Memory backend: tiles are lost on exit"),
    }
    info!(
        "  Cache: {}",
        if config.cache_enabled() {
            "write-through"
        } else {
            "disabled"
        }
    );
    info!("  Storage timeout: {}ms", config.storage_timeout_ms);

    // Open the backend and fail fast if it is unusable
    let store = match config.open_store().await {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to open {} backend: {}", config.backend, e);
            return ExitCode::FAILURE;
        }
    };

    let inventory = InventoryService::with_cache(store, config.cache_enabled())
        .with_timeout(config.storage_timeout());

    match inventory.check_storage().await {
        Ok(count) => info!("  Connected to storage, {} tile(s) stored", count),
        Err(e) => {
            error!("Storage check failed: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if let Err(e) = inventory.warm().await {
        error!("Failed to load tiles into cache: {}", e);
        return ExitCode::FAILURE;
    }

    let router = create_router(inventory, build_router_config(&config));

    // Bind and serve
    let addr = config.bind_address();

    info!("");
    info!("  Server listening on: http://{}", addr);
    info!("    curl http://{}/tiles", addr);
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "tile_inventory=debug,tower_http=debug"
    } else {
        "tile_inventory=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application Config.
fn build_router_config(config: &Config) -> RouterConfig {
    let mut router_config = RouterConfig::new();

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config.with_tracing(!config.no_tracing)
}
