//! HTTP request handlers for the tile inventory API.
//!
//! This module contains the Axum handlers for the tile endpoints and the
//! health check.
//!
//! # Endpoints
//!
//! - `POST /tiles` - Create a tile
//! - `GET /tiles` - List tiles
//! - `GET /tiles/{id}` - Fetch a tile
//! - `PUT /tiles/{id}` - Replace a tile's name and stock
//! - `PUT /tiles/{id}/stock` - Adjust stock by a signed delta
//! - `DELETE /tiles/{id}` - Delete a tile
//! - `GET /health` - Health check endpoint

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::error::TileError;
use crate::inventory::InventoryService;
use crate::store::TileStore;
use crate::tile::{parse_stock_delta, NewTile, Tile};

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the inventory service.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<S: TileStore> {
    /// The inventory service backing every tile endpoint
    pub inventory: Arc<InventoryService<S>>,
}

impl<S: TileStore> AppState<S> {
    /// Create a new application state with the given service.
    pub fn new(inventory: InventoryService<S>) -> Self {
        Self {
            inventory: Arc::new(inventory),
        }
    }

    /// Create application state around an already shared service.
    pub fn with_shared(inventory: Arc<InventoryService<S>>) -> Self {
        Self { inventory }
    }
}

impl<S: TileStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            inventory: Arc::clone(&self.inventory),
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "not_found", "decode_error")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Create a new error response with status code.
    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,

    /// Configured storage backend
    pub backend: String,
}

/// Response from the delete endpoint.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    /// Identifier of the deleted tile
    pub id: String,

    pub message: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert TileError to HTTP response.
///
/// 5xx errors are logged at ERROR, 404s at DEBUG and other client errors at
/// WARN.
impl IntoResponse for TileError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            TileError::Decode { .. } => (StatusCode::BAD_REQUEST, "decode_error"),
            TileError::InvalidStock { .. } => (StatusCode::BAD_REQUEST, "invalid_stock"),
            TileError::InvalidId { .. } => (StatusCode::NOT_FOUND, "invalid_id"),
            TileError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            TileError::DuplicateKey { .. } => (StatusCode::CONFLICT, "duplicate_key"),
            TileError::StorageUnavailable { .. } | TileError::Timeout { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_unavailable")
            }
        };
        let message = self.to_string();

        if status.is_server_error() {
            error!(
                error_type = error_type,
                status = status.as_u16(),
                "Server error: {}",
                message
            );
        } else if status == StatusCode::NOT_FOUND {
            debug!(
                error_type = error_type,
                status = status.as_u16(),
                "Resource not found: {}",
                message
            );
        } else {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                message
            );
        }

        let error_response = ErrorResponse::with_status(error_type, message, status);

        (status, Json(error_response)).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle tile creation.
///
/// # Endpoint
///
/// `POST /tiles`
///
/// # Request Body
///
/// ```json
/// { "name": "Kajaria", "stock": 10 }
/// ```
///
/// # Response
///
/// - `200 OK`: the created tile, including its assigned `id`
/// - `400 Bad Request`: body is not a valid tile
/// - `500 Internal Server Error`: storage unavailable
pub async fn create_tile_handler<S: TileStore>(
    State(state): State<AppState<S>>,
    body: Bytes,
) -> Result<Json<Tile>, TileError> {
    let new = NewTile::from_json(&body)?;
    let tile = state.inventory.create_tile(new).await?;
    Ok(Json(tile))
}

/// Handle tile listing.
///
/// # Endpoint
///
/// `GET /tiles`
///
/// # Response
///
/// `200 OK` with a JSON array of tiles ordered by identifier.
pub async fn list_tiles_handler<S: TileStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<Tile>>, TileError> {
    let tiles = state.inventory.list_tiles().await?;
    Ok(Json(tiles))
}

/// Handle single tile lookups.
///
/// # Endpoint
///
/// `GET /tiles/{id}`
///
/// # Errors
///
/// - `404 Not Found`: no such tile, or the id is malformed for the backend
pub async fn get_tile_handler<S: TileStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Tile>, TileError> {
    let tile = state.inventory.get_tile(&id).await?;
    Ok(Json(tile))
}

/// Handle full replacement of a tile's name and stock.
///
/// # Endpoint
///
/// `PUT /tiles/{id}`
///
/// # Request Body
///
/// ```json
/// { "name": "Kajaria", "stock": 25 }
/// ```
///
/// An `id` field in the body is ignored.
///
/// # Errors
///
/// - `400 Bad Request`: body is not a valid tile
/// - `404 Not Found`: no such tile, or the id is malformed
pub async fn update_tile_handler<S: TileStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Tile>, TileError> {
    let new = NewTile::from_json(&body)?;
    let tile = state.inventory.update_tile(&id, new).await?;
    Ok(Json(tile))
}

/// Handle stock adjustments.
///
/// # Endpoint
///
/// `PUT /tiles/{id}/stock`
///
/// # Request Body
///
/// A bare signed JSON integer, e.g. `5` or `-3`.
///
/// # Errors
///
/// - `400 Bad Request`: body is not an integer, or the result overflows
/// - `404 Not Found`: no such tile, or the id is malformed
pub async fn adjust_stock_handler<S: TileStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Tile>, TileError> {
    let delta = parse_stock_delta(&body)?;
    let tile = state.inventory.adjust_stock(&id, delta).await?;
    Ok(Json(tile))
}

/// Handle tile deletion.
///
/// # Endpoint
///
/// `DELETE /tiles/{id}`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// { "id": "1", "message": "Tile deleted" }
/// ```
pub async fn delete_tile_handler<S: TileStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, TileError> {
    state.inventory.delete_tile(&id).await?;
    Ok(Json(DeleteResponse {
        id,
        message: "Tile deleted".to_string(),
    }))
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "backend": "sqlite"
/// }
/// ```
pub async fn health_handler<S: TileStore>(
    State(state): State<AppState<S>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.inventory.store_kind().to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
