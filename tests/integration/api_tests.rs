//! API integration tests for the tile endpoints.
//!
//! Tests verify:
//! - The create → adjust → delete → lookup lifecycle
//! - Full replacement through `PUT /tiles/{id}`
//! - Decode errors and malformed identifiers
//! - HTTP response codes and JSON error bodies

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

use tile_inventory::store::MemoryTileStore;

use super::test_utils::{delete, get, post, put, router_for};

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn test_kajaria_lifecycle() {
    let router = router_for(MemoryTileStore::new());

    let (status, body) = post(&router, "/tiles", r#"{"name":"Kajaria","stock":10}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": "1", "name": "Kajaria", "stock": 10}));

    let (status, body) = put(&router, "/tiles/1/stock", "5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": "1", "name": "Kajaria", "stock": 15}));

    let (status, body) = delete(&router, "/tiles/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "1");

    let (status, body) = get(&router, "/tiles/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_create_then_get_round_trip() {
    let router = router_for(MemoryTileStore::new());

    let (_, created) = post(&router, "/tiles", r#"{"name":"Somany","stock":7}"#).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());

    let (status, fetched) = get(&router, &format!("/tiles/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_client_supplied_id_is_ignored() {
    let router = router_for(MemoryTileStore::new());

    let (status, body) = post(
        &router,
        "/tiles",
        r#"{"id":"500","name":"Kajaria","stock":1}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "1");
}

#[tokio::test]
async fn test_stock_adjustments_are_additive() {
    let router = router_for(MemoryTileStore::new());
    post(&router, "/tiles", r#"{"name":"Kajaria","stock":10}"#).await;

    put(&router, "/tiles/1/stock", "7").await;
    let (status, body) = put(&router, "/tiles/1/stock", "-4").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stock"], 13);
}

#[tokio::test]
async fn test_negative_stock_is_accepted() {
    let router = router_for(MemoryTileStore::new());
    post(&router, "/tiles", r#"{"name":"Kajaria","stock":1}"#).await;

    let (status, body) = put(&router, "/tiles/1/stock", "-3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stock"], -2);
}

#[tokio::test]
async fn test_stock_overflow_rejected() {
    let router = router_for(MemoryTileStore::new());
    post(
        &router,
        "/tiles",
        &format!(r#"{{"name":"Kajaria","stock":{}}}"#, i64::MAX),
    )
    .await;

    let (status, body) = put(&router, "/tiles/1/stock", "1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_stock");

    let (_, body) = get(&router, "/tiles/1").await;
    assert_eq!(body["stock"], i64::MAX);
}

#[tokio::test]
async fn test_replace_tile() {
    let router = router_for(MemoryTileStore::new());
    post(&router, "/tiles", r#"{"name":"Kajaria","stock":10}"#).await;

    let (status, body) = put(&router, "/tiles/1", r#"{"name":"Kajaria Matt","stock":3}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": "1", "name": "Kajaria Matt", "stock": 3}));

    let (_, body) = get(&router, "/tiles/1").await;
    assert_eq!(body["name"], "Kajaria Matt");
}

#[tokio::test]
async fn test_replace_missing_tile() {
    let router = router_for(MemoryTileStore::new());
    let (status, body) = put(&router, "/tiles/3", r#"{"name":"x","stock":0}"#).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_list_empty() {
    let router = router_for(MemoryTileStore::new());
    let (status, body) = get(&router, "/tiles").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_list_after_creates_and_deletes() {
    let router = router_for(MemoryTileStore::new());
    for i in 0..12 {
        post(
            &router,
            "/tiles",
            &format!(r#"{{"name":"tile-{}","stock":{}}}"#, i, i),
        )
        .await;
    }
    for id in ["2", "5", "11"] {
        let (status, _) = delete(&router, &format!("/tiles/{}", id)).await;
        assert_eq!(status, StatusCode::OK);
    }
    put(&router, "/tiles/10/stock", "100").await;

    let (status, body) = get(&router, "/tiles").await;
    assert_eq!(status, StatusCode::OK);

    let tiles = body.as_array().unwrap();
    assert_eq!(tiles.len(), 9);

    let ids: Vec<&str> = tiles.iter().map(|t| t["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["1", "3", "4", "6", "7", "8", "9", "10", "12"]);

    let ten = tiles.iter().find(|t| t["id"] == "10").unwrap();
    assert_eq!(ten["stock"], 109);
}

// =============================================================================
// Error Cases
// =============================================================================

#[tokio::test]
async fn test_invalid_id_is_not_found() {
    let router = router_for(MemoryTileStore::new());

    let (status, body) = get(&router, "/tiles/not-an-id").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "invalid_id");
    assert_eq!(body["status"], 404);
    assert!(body["message"].as_str().unwrap().contains("not-an-id"));

    let (status, _) = delete(&router, "/tiles/not-an-id").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = put(&router, "/tiles/not-an-id/stock", "1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_decode_errors() {
    let router = router_for(MemoryTileStore::new());

    for body in [
        r#"{"name":"Kajaria"}"#,
        r#"{"stock":5}"#,
        r#"{"name":"Kajaria","stock":"ten"}"#,
        r#"{"name":42,"stock":1}"#,
        "not json",
        "",
    ] {
        let (status, json) = post(&router, "/tiles", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(json["error"], "decode_error");
    }

    // Nothing was stored
    let (_, body) = get(&router, "/tiles").await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_adjust_decode_error() {
    let router = router_for(MemoryTileStore::new());
    post(&router, "/tiles", r#"{"name":"Kajaria","stock":1}"#).await;

    let (status, body) = put(&router, "/tiles/1/stock", r#"{"delta":5}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "decode_error");

    let (status, _) = put(&router, "/tiles/1/stock", "2.5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_replace_decode_error() {
    let router = router_for(MemoryTileStore::new());
    post(&router, "/tiles", r#"{"name":"Kajaria","stock":1}"#).await;

    let (status, body) = put(&router, "/tiles/1", "5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "decode_error");
}

#[tokio::test]
async fn test_adjust_missing_tile() {
    let router = router_for(MemoryTileStore::new());
    let (status, body) = put(&router, "/tiles/8/stock", "1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_body_without_content_type() {
    let router = router_for(MemoryTileStore::new());

    let request = Request::builder()
        .method("POST")
        .uri("/tiles")
        .body(Body::from(r#"{"name":"Kajaria","stock":2}"#))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder()
        .method("PUT")
        .uri("/tiles/1/stock")
        .body(Body::from("3"))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let tile: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(tile["stock"], 5);
}

#[tokio::test]
async fn test_unsupported_method() {
    let router = router_for(MemoryTileStore::new());

    let request = Request::builder()
        .method("PATCH")
        .uri("/tiles/1")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// =============================================================================
// Health Check
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let router = router_for(MemoryTileStore::new());

    let (status, body) = get(&router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["backend"], "memory");
    assert!(body["version"].is_string());
}
