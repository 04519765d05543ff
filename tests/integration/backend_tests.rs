//! Backend integration tests.
//!
//! Tests verify:
//! - The same HTTP contract holds for every storage backend
//! - SQLite and document collections survive reopening
//! - The inventory cache is rebuilt from a persistent store
//! - Decimal backends agree on identifier assignment
//! - The cache follows the store after a timed-out write

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;
use tempfile::TempDir;

use tile_inventory::store::{
    DocumentTileStore, MemoryTileStore, ObjectId, SqliteTileStore, StoreKind, TileStore,
};
use tile_inventory::tile::{NewTile, Tile};
use tile_inventory::{create_router, InventoryService, RouterConfig, TileError};

use super::test_utils::{delete, get, post, put, router_for};

/// Run the full tile lifecycle against `router` and return the created id.
async fn exercise_lifecycle(router: &axum::Router) -> String {
    let (status, created) = post(router, "/tiles", r#"{"name":"Kajaria","stock":10}"#).await;
    assert_eq!(status, StatusCode::OK);
    let id = created["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());

    let (status, body) = put(router, &format!("/tiles/{}/stock", id), "5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stock"], 15);

    let (status, body) = put(
        router,
        &format!("/tiles/{}", id),
        r#"{"name":"Kajaria Gloss","stock":20}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": id, "name": "Kajaria Gloss", "stock": 20}));

    let (status, body) = get(router, "/tiles").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = delete(router, &format!("/tiles/{}", id)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(router, &format!("/tiles/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = delete(router, &format!("/tiles/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    id
}

// =============================================================================
// Shared Contract
// =============================================================================

#[tokio::test]
async fn test_memory_backend_lifecycle() {
    let router = router_for(MemoryTileStore::new());
    assert_eq!(exercise_lifecycle(&router).await, "1");
}

#[tokio::test]
async fn test_sqlite_backend_lifecycle() {
    let router = router_for(SqliteTileStore::open_in_memory().unwrap());
    assert_eq!(exercise_lifecycle(&router).await, "1");
}

#[tokio::test]
async fn test_document_backend_lifecycle() {
    let router = router_for(DocumentTileStore::in_memory());
    let id = exercise_lifecycle(&router).await;
    assert!(ObjectId::parse_str(&id).is_ok());
}

/// Check that the next decimal id is one above the highest stored id.
async fn assert_next_id_follows_highest<S: TileStore>(store: S) {
    for name in ["Kajaria", "Somany"] {
        store.create(NewTile::new(name, 0)).await.unwrap();
    }

    store.delete("2").await.unwrap();
    let tile = store.create(NewTile::new("Orient", 0)).await.unwrap();
    assert_eq!(tile.id, "2", "{} backend", store.kind());

    store.delete("1").await.unwrap();
    let tile = store.create(NewTile::new("Johnson", 0)).await.unwrap();
    assert_eq!(tile.id, "3", "{} backend", store.kind());
}

#[tokio::test]
async fn test_memory_next_id_follows_highest() {
    assert_next_id_follows_highest(MemoryTileStore::new()).await;
}

#[tokio::test]
async fn test_sqlite_next_id_follows_highest() {
    assert_next_id_follows_highest(SqliteTileStore::open_in_memory().unwrap()).await;
}

#[tokio::test]
async fn test_document_update_returns_stored_id() {
    let router = router_for(DocumentTileStore::in_memory());
    let (_, created) = post(&router, "/tiles", r#"{"name":"Kajaria","stock":1}"#).await;
    let id = created["id"].as_str().unwrap().to_string();
    let upper = id.to_uppercase();

    let (status, body) = put(
        &router,
        &format!("/tiles/{}", upper),
        r#"{"name":"Kajaria","stock":3}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.as_str());

    let (status, body) = put(&router, &format!("/tiles/{}/stock", upper), "2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": id, "name": "Kajaria", "stock": 5}));
}

#[tokio::test]
async fn test_document_backend_rejects_decimal_ids() {
    let router = router_for(DocumentTileStore::in_memory());

    let (status, body) = get(&router, "/tiles/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "invalid_id");

    let (status, body) = get(&router, "/tiles/not-an-id").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "invalid_id");

    let (status, body) = get(&router, "/tiles/65a1b2c3000000000000000a").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_document_ids_are_unique() {
    let router = router_for(DocumentTileStore::in_memory());
    let mut ids = Vec::new();
    for i in 0..20 {
        let (_, body) = post(
            &router,
            "/tiles",
            &format!(r#"{{"name":"t{}","stock":0}}"#, i),
        )
        .await;
        ids.push(body["id"].as_str().unwrap().to_string());
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 20);
}

// =============================================================================
// Persistence
// =============================================================================

#[tokio::test]
async fn test_sqlite_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tiles.db");

    {
        let store = SqliteTileStore::open(&path).unwrap();
        let router = router_for(store);
        post(&router, "/tiles", r#"{"name":"Kajaria","stock":10}"#).await;
        post(&router, "/tiles", r#"{"name":"Somany","stock":4}"#).await;
        put(&router, "/tiles/2/stock", "-1").await;
    }

    let store = SqliteTileStore::open(&path).unwrap();
    assert_eq!(store.path(), Some(path.as_path()));

    let service = InventoryService::new(store);
    assert_eq!(service.warm().await.unwrap(), 2);

    let router = create_router(service, RouterConfig::new().with_tracing(false));
    let (_, body) = get(&router, "/tiles/2").await;
    assert_eq!(body, json!({"id": "2", "name": "Somany", "stock": 3}));

    // The sequence continues after the highest stored id
    let (_, body) = post(&router, "/tiles", r#"{"name":"Orient","stock":0}"#).await;
    assert_eq!(body["id"], "3");
}

#[tokio::test]
async fn test_document_collection_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tiles.json");

    let id = {
        let store = DocumentTileStore::open(&path).await.unwrap();
        let tile = store.create(NewTile::new("Kajaria", 10)).await.unwrap();
        store.create(NewTile::new("Somany", 1)).await.unwrap();
        store
            .update(&tile.id, NewTile::new("Kajaria", 12))
            .await
            .unwrap();
        tile.id
    };

    let store = DocumentTileStore::open(&path).await.unwrap();
    let tiles = store.list().await.unwrap();
    assert_eq!(tiles.len(), 2);
    assert_eq!(tiles[0].id, id);
    assert_eq!(tiles[0].stock, 12);
    assert_eq!(tiles[1].name, "Somany");

    // Documents are stored with an `_id` key
    let raw: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(raw[0]["_id"], id.as_str());
}

#[tokio::test]
async fn test_document_open_creates_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fresh.json");

    let store = DocumentTileStore::open(&path).await.unwrap();
    assert!(path.exists());
    assert_eq!(store.kind(), StoreKind::Document);
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_document_open_rejects_corrupt_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("corrupt.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(DocumentTileStore::open(&path).await.is_err());
}

#[tokio::test]
async fn test_sqlite_open_fails_for_missing_directory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("tiles.db");
    assert!(SqliteTileStore::open(&path).is_err());
}

// =============================================================================
// Cache Consistency
// =============================================================================

#[tokio::test]
async fn test_sqlite_cache_follows_timed_out_create() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tiles.db");
    let store = Arc::new(SqliteTileStore::open(&path).unwrap());
    let service =
        InventoryService::new(Arc::clone(&store)).with_timeout(Duration::from_millis(200));
    assert!(service.cache_enabled());

    // A second connection holds the database while the create is pending
    let holder = rusqlite::Connection::open(&path).unwrap();
    holder.execute_batch("BEGIN EXCLUSIVE").unwrap();
    let release = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(500));
        holder.execute_batch("COMMIT").unwrap();
    });

    let err = service
        .create_tile(NewTile::new("Kajaria", 10))
        .await
        .unwrap_err();
    assert!(matches!(err, TileError::Timeout { operation: "create", .. }));

    // The abandoned insert completes once the database is released
    tokio::task::spawn_blocking(move || release.join().unwrap())
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;

    let tiles = service.list_tiles().await.unwrap();
    assert_eq!(tiles, store.list().await.unwrap());
    assert_eq!(tiles, vec![Tile::new("1", "Kajaria", 10)]);

    assert_eq!(service.adjust_stock("1", 5).await.unwrap().stock, 15);
    assert_eq!(service.get_tile("1").await.unwrap().stock, 15);
    assert_eq!(store.get("1").await.unwrap().stock, 15);
}
