//! Cache tree integration tests.
//!
//! Tests verify:
//! - Every served body is mirrored at `{cache_root}{request_path}`
//! - Request case is preserved in the cache tree
//! - Concurrent renders of one path leave a single valid file
//! - Failures leave nothing behind and map to the right responses

use axum::http::StatusCode;
use std::fs;

use image_gateway::store::DocumentStore;

use super::test_utils::{create_test_jpeg, create_test_png, TestGateway};

#[tokio::test]
async fn test_original_is_mirrored_to_cache() {
    let gateway = TestGateway::new();
    gateway.post("/photos/cat.png", create_test_png(32, 32)).await;

    let response = gateway.get("/photos/cat.png").await;
    assert_eq!(response.status, StatusCode::OK);

    let cached = fs::read(gateway.cache.path().join("photos/cat.png")).unwrap();
    assert_eq!(cached, response.body.to_vec());
}

#[tokio::test]
async fn test_variant_is_mirrored_under_its_own_name() {
    let gateway = TestGateway::new();
    gateway.post("/photos/wide.jpg", create_test_jpeg(200, 100)).await;

    let response = gateway.get("/photos/wide__50z50.jpg").await;
    assert_eq!(response.status, StatusCode::OK);

    let cached = fs::read(gateway.cache.path().join("photos/wide__50z50.jpg")).unwrap();
    assert_eq!(cached, response.body.to_vec());
    assert!(!gateway.cache.path().join("photos/wide.jpg").exists());
}

#[tokio::test]
async fn test_cache_path_keeps_request_case() {
    let gateway = TestGateway::new();
    gateway.post("/photos/cat.png", create_test_png(8, 8)).await;

    gateway.get("/Photos/Cat.PNG").await;

    assert!(gateway.cache.path().join("Photos/Cat.PNG").is_file());
}

#[tokio::test]
async fn test_cache_path_is_percent_decoded() {
    let gateway = TestGateway::new();
    gateway
        .post("/my%20album/cat.png", create_test_png(8, 8))
        .await;

    gateway.get("/my%20album/cat.png").await;

    assert!(gateway.cache.path().join("my album/cat.png").is_file());
}

#[tokio::test]
async fn test_cache_writes_stay_under_root() {
    let gateway = TestGateway::new();
    gateway
        .post("/../../escape/cat.png", create_test_png(8, 8))
        .await;

    let response = gateway.get("/../../escape/cat.png").await;
    assert_eq!(response.status, StatusCode::OK);

    assert!(gateway.cache.path().join("escape/cat.png").is_file());
}

#[tokio::test]
async fn test_rerender_overwrites_cache_file() {
    let gateway = TestGateway::new();
    gateway.post("/photos/cat.png", create_test_png(10, 10)).await;
    gateway.get("/photos/cat.png").await;

    gateway.post("/photos/cat.png", create_test_png(20, 20)).await;
    let response = gateway.get("/photos/cat.png").await;

    let cached = fs::read(gateway.cache.path().join("photos/cat.png")).unwrap();
    assert_eq!(cached, response.body.to_vec());
    assert_eq!(response.image_dimensions(), (20, 20));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_renders_of_same_path() {
    let gateway = TestGateway::new();
    gateway.post("/photos/wide.png", create_test_png(300, 150)).await;

    let (a, b, c, d) = tokio::join!(
        gateway.get("/photos/wide__60x60.png"),
        gateway.get("/photos/wide__60x60.png"),
        gateway.get("/photos/wide__60x60.png"),
        gateway.get("/photos/wide__60x60.png"),
    );

    for response in [&a, &b, &c, &d] {
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, a.body);
    }

    let cached = fs::read(gateway.cache.path().join("photos/wide__60x60.png")).unwrap();
    assert_eq!(cached, a.body.to_vec());

    // Only the final file remains; no temp files are left in the folder
    let entries: Vec<_> = fs::read_dir(gateway.cache.path().join("photos"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn test_missing_image_leaves_no_cache_file() {
    let gateway = TestGateway::new();

    gateway.get("/photos/ghost.png").await;

    assert!(!gateway.cache.path().join("photos").exists());
}

#[tokio::test]
async fn test_favicon_leaves_no_cache_file() {
    let gateway = TestGateway::new();

    gateway.get("/favicon.ico").await;

    assert!(!gateway.cache.path().join("favicon.ico").exists());
}

#[tokio::test]
async fn test_unreadable_stored_bytes_fail_variant_only() {
    let gateway = TestGateway::new();
    gateway.post("/photos/cat.png", create_test_png(16, 16)).await;
    let stored = gateway.store.document("cat.png", "photos").await.unwrap();

    // Replace the stored binary with bytes that are not an image
    gateway
        .store
        .save(&stored.with_binary(&b"not an image"[..]))
        .await
        .unwrap();

    let original = gateway.get("/photos/cat.png").await;
    assert_eq!(original.status, StatusCode::OK);
    assert_eq!(original.text(), "not an image");

    let variant = gateway.get("/photos/cat__8x8.png").await;
    assert_eq!(variant.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!gateway.cache.path().join("photos/cat__8x8.png").exists());
}

#[tokio::test]
async fn test_cache_folder_failure() {
    let gateway = TestGateway::new();
    gateway.post("/blocked/cat.png", create_test_png(8, 8)).await;

    // A regular file where the cache folder should go
    fs::write(gateway.cache.path().join("blocked"), b"in the way").unwrap();

    let response = gateway.get("/blocked/cat.png").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text(), "can not make cache folder");
}
