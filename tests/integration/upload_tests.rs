//! Write path integration tests.
//!
//! Tests verify:
//! - Successful uploads answer `stored\n`
//! - Originals above the stored size are shrunk, smaller ones kept
//! - Overwrites replace the binary
//! - Bad bodies, missing names and oversized bodies are rejected

use axum::http::StatusCode;
use tempfile::TempDir;

use image_gateway::server::RouterConfig;

use super::test_utils::{
    create_test_jpeg, create_test_png, failing_router, is_valid_jpeg, send, TestGateway,
};

#[tokio::test]
async fn test_upload_answers_stored() {
    let gateway = TestGateway::new();

    let response = gateway.post("/photos/cat.png", create_test_png(20, 20)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "stored\n");
    assert_eq!(gateway.store.save_count(), 1);
}

#[tokio::test]
async fn test_upload_keeps_format() {
    let gateway = TestGateway::new();
    gateway.post("/photos/cat.jpg", create_test_jpeg(20, 20)).await;

    let stored = gateway.store.document("cat.jpg", "photos").await.unwrap();
    assert!(is_valid_jpeg(&stored.binary));
}

#[tokio::test]
async fn test_upload_over_stored_size_is_downsized() {
    let gateway = TestGateway::with_stored_size(100, 100);
    gateway.post("/photos/wide.png", create_test_png(400, 200)).await;

    let response = gateway.get("/photos/wide.png").await;
    assert_eq!(response.image_dimensions(), (100, 50));
}

#[tokio::test]
async fn test_upload_over_single_bound_is_downsized() {
    let gateway = TestGateway::with_stored_size(0, 60);
    gateway.post("/photos/tall.png", create_test_png(90, 120)).await;

    let response = gateway.get("/photos/tall.png").await;
    assert_eq!(response.image_dimensions(), (45, 60));
}

#[tokio::test]
async fn test_upload_within_stored_size_is_not_resized() {
    let gateway = TestGateway::with_stored_size(100, 100);
    gateway.post("/photos/small.png", create_test_png(80, 30)).await;

    let response = gateway.get("/photos/small.png").await;
    assert_eq!(response.image_dimensions(), (80, 30));
}

#[tokio::test]
async fn test_upload_overwrites_existing() {
    let gateway = TestGateway::new();
    gateway
        .post_typed("/photos/cat.png", create_test_png(10, 10), "image/png")
        .await;
    gateway.post("/photos/CAT.png", create_test_png(30, 20)).await;

    let response = gateway.get("/photos/cat.png").await;
    assert_eq!(response.image_dimensions(), (30, 20));
    // The second upload sent no content type, so the first one is kept
    assert_eq!(response.content_type(), Some("image/png"));
}

#[tokio::test]
async fn test_upload_garbage_is_bad_request() {
    let gateway = TestGateway::new();

    let response = gateway.post("/photos/cat.png", &b"definitely not an image"[..]).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(!response.text().is_empty());
    assert_eq!(gateway.store.save_count(), 0);
    assert_eq!(
        gateway.get("/photos/cat.png").await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_upload_empty_body_is_bad_request() {
    let gateway = TestGateway::new();

    let response = gateway.post("/photos/cat.png", Vec::new()).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_without_name_is_bad_request() {
    let gateway = TestGateway::new();

    let root = gateway.post("/", create_test_png(4, 4)).await;
    assert_eq!(root.status, StatusCode::BAD_REQUEST);

    let folder = gateway.post("/photos/", create_test_png(4, 4)).await;
    assert_eq!(folder.status, StatusCode::BAD_REQUEST);

    assert_eq!(gateway.store.save_count(), 0);
}

#[tokio::test]
async fn test_upload_over_body_limit_is_rejected() {
    let gateway = TestGateway::with_router_config(
        RouterConfig::new()
            .with_tracing(false)
            .with_max_upload_bytes(1024),
    );

    let response = gateway.post("/photos/big.png", vec![0u8; 4096]).await;

    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(gateway.store.save_count(), 0);
}

#[tokio::test]
async fn test_upload_store_outage_is_server_error() {
    let cache = TempDir::new().unwrap();
    let router = failing_router(&cache);

    let request = axum::http::Request::post("/photos/cat.png")
        .body(axum::body::Body::from(create_test_png(4, 4)))
        .unwrap();
    let response = send(&router, request).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
}
