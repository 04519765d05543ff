use thiserror::Error;

/// Errors reported by a storage backend.
///
/// Every backend maps its driver errors into these kinds before returning,
/// so nothing backend-specific crosses the [`TileStore`](crate::store::TileStore)
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Identifier is not well-formed for this backend
    #[error("Invalid tile id: {0}")]
    InvalidId(String),

    /// No record matches the identifier
    #[error("Tile not found: {0}")]
    NotFound(String),

    /// A record with this identifier already exists
    #[error("Duplicate tile id: {0}")]
    DuplicateKey(String),

    /// Backend unreachable or failed to complete the operation
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by the inventory service and the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileError {
    /// Request payload could not be decoded
    #[error("Malformed request body: {message}")]
    Decode { message: String },

    /// Identifier is not well-formed for the configured backend
    #[error("Invalid tile id: {id}")]
    InvalidId { id: String },

    /// No tile with this identifier
    #[error("Tile not found: {id}")]
    NotFound { id: String },

    /// Create collided with an existing identifier
    #[error("Duplicate tile id: {id}")]
    DuplicateKey { id: String },

    /// Stock adjustment would overflow the stock counter
    #[error("Stock adjustment of {delta} overflows current stock {stock}")]
    InvalidStock { stock: i64, delta: i64 },

    /// Backend unreachable or reported a failure
    #[error("Storage unavailable: {message}")]
    StorageUnavailable { message: String },

    /// Backend call exceeded the storage timeout
    #[error("Storage operation '{operation}' timed out after {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },
}

impl From<StoreError> for TileError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidId(id) => TileError::InvalidId { id },
            StoreError::NotFound(id) => TileError::NotFound { id },
            StoreError::DuplicateKey(id) => TileError::DuplicateKey { id },
            StoreError::Unavailable(message) => TileError::StorageUnavailable { message },
        }
    }
}

impl From<serde_json::Error> for TileError {
    fn from(err: serde_json::Error) -> Self {
        TileError::Decode {
            message: err.to_string(),
        }
    }
}
