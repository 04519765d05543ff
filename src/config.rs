//! Configuration management for the tile inventory service.
//!
//! This module provides a configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables with `TILES_` prefix
//! - Defaults for every setting
//!
//! # Example
//!
//! ```ignore
//! use tile_inventory::config::Config;
//!
//! // Parse from command line and environment
//! let config = Config::parse();
//!
//! println!("Listening on {}", config.bind_address());
//! println!("Backend: {}", config.backend);
//! ```
//!
//! # Environment Variables
//!
//! - `TILES_HOST` - Server bind address (default: 0.0.0.0)
//! - `TILES_PORT` - Server port (default: 8080)
//! - `TILES_BACKEND` - Storage backend: memory, sqlite, document (default: sqlite)
//! - `TILES_SQLITE_PATH` - SQLite database file (default: ./tiles.db)
//! - `TILES_DOCUMENT_PATH` - Document collection file (default: ./tiles.json)
//! - `TILES_NO_CACHE` - Disable the write-through cache
//! - `TILES_STORAGE_TIMEOUT_MS` - Per-call storage timeout (default: 5000)
//! - `TILES_CORS_ORIGINS` - Allowed CORS origins, comma-separated

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use crate::error::StoreError;
use crate::store::{DocumentTileStore, MemoryTileStore, SqliteTileStore, StoreKind, TileStore};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default SQLite database file.
pub const DEFAULT_SQLITE_PATH: &str = "./tiles.db";

/// Default document collection file.
pub const DEFAULT_DOCUMENT_PATH: &str = "./tiles.json";

/// Default storage call timeout in milliseconds.
pub const DEFAULT_STORAGE_TIMEOUT_MS: u64 = 5000;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Tile Inventory - create, list, update and delete tiles over HTTP.
#[derive(Parser, Debug, Clone)]
#[command(name = "tile-inventory")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "TILES_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "TILES_PORT")]
    pub port: u16,

    // =========================================================================
    // Storage Configuration
    // =========================================================================
    /// Storage backend.
    #[arg(long, value_enum, default_value_t = StoreKind::Sqlite, env = "TILES_BACKEND")]
    pub backend: StoreKind,

    /// SQLite database file (sqlite backend).
    #[arg(long, default_value = DEFAULT_SQLITE_PATH, env = "TILES_SQLITE_PATH")]
    pub sqlite_path: PathBuf,

    /// Document collection file (document backend).
    #[arg(long, default_value = DEFAULT_DOCUMENT_PATH, env = "TILES_DOCUMENT_PATH")]
    pub document_path: PathBuf,

    /// Disable the write-through tile cache.
    ///
    /// The document backend never uses the cache.
    #[arg(long, default_value_t = false, env = "TILES_NO_CACHE")]
    pub no_cache: bool,

    /// Timeout for a single storage call, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_STORAGE_TIMEOUT_MS, env = "TILES_STORAGE_TIMEOUT_MS")]
    pub storage_timeout_ms: u64,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "TILES_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("port must be greater than 0".to_string());
        }

        if self.storage_timeout_ms == 0 {
            return Err("storage_timeout_ms must be greater than 0".to_string());
        }

        match self.backend {
            StoreKind::Sqlite if self.sqlite_path.as_os_str().is_empty() => {
                return Err(
                    "SQLite path is required. Set --sqlite-path or TILES_SQLITE_PATH".to_string(),
                );
            }
            StoreKind::Document if self.document_path.as_os_str().is_empty() => {
                return Err(
                    "Document path is required. Set --document-path or TILES_DOCUMENT_PATH"
                        .to_string(),
                );
            }
            _ => {}
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Storage call timeout.
    pub fn storage_timeout(&self) -> Duration {
        Duration::from_millis(self.storage_timeout_ms)
    }

    /// Whether the inventory service should cache tiles.
    pub fn cache_enabled(&self) -> bool {
        self.backend.uses_cache() && !self.no_cache
    }

    /// Open the configured storage backend.
    pub async fn open_store(&self) -> Result<Arc<dyn TileStore>, StoreError> {
        let store: Arc<dyn TileStore> = match self.backend {
            StoreKind::Memory => Arc::new(MemoryTileStore::new()),
            StoreKind::Sqlite => Arc::new(SqliteTileStore::open(&self.sqlite_path)?),
            StoreKind::Document => Arc::new(DocumentTileStore::open(&self.document_path).await?),
        };
        Ok(store)
    }
}

// =============================================================================
// Tests
// =============================================================================
