//! Read path integration tests.
//!
//! Tests verify:
//! - Originals are served byte-for-byte as stored
//! - Fit-within and cover-crop variants have the right dimensions
//! - Case-insensitive and percent-encoded addressing
//! - Error cases (missing image, bad encoding, store down)

use axum::http::StatusCode;
use tempfile::TempDir;

use super::test_utils::{
    create_test_jpeg, create_test_png, create_test_rgba_png, failing_router, is_valid_jpeg,
    is_valid_png, send, TestGateway,
};

// =============================================================================
// Originals
// =============================================================================

#[tokio::test]
async fn test_get_missing_image_is_empty_404() {
    let gateway = TestGateway::new();

    let response = gateway.get("/photos/missing.png").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body.is_empty());
    assert_eq!(gateway.store.find_count(), 1);
}

#[tokio::test]
async fn test_get_original_matches_stored_bytes() {
    let gateway = TestGateway::new();
    assert_eq!(
        gateway.post("/photos/cat.png", create_test_png(64, 32)).await.status,
        StatusCode::OK
    );

    let response = gateway.get("/photos/cat.png").await;
    assert_eq!(response.status, StatusCode::OK);

    let stored = gateway.store.document("cat.png", "photos").await.unwrap();
    assert_eq!(response.body, stored.binary);
    assert_eq!(response.image_dimensions(), (64, 32));
}

#[tokio::test]
async fn test_get_uses_recorded_content_type() {
    let gateway = TestGateway::new();
    gateway
        .post_typed("/photos/cat.png", create_test_png(8, 8), "image/x-custom")
        .await;

    let response = gateway.get("/photos/cat.png").await;
    assert_eq!(response.content_type(), Some("image/x-custom"));
}

#[tokio::test]
async fn test_get_sniffs_content_type_when_none_recorded() {
    let gateway = TestGateway::new();
    gateway.post("/photos/a.jpg", create_test_jpeg(16, 16)).await;
    gateway.post("/photos/b.png", create_test_png(16, 16)).await;

    let jpeg = gateway.get("/photos/a.jpg").await;
    assert_eq!(jpeg.content_type(), Some("image/jpeg"));
    assert!(is_valid_jpeg(&jpeg.body));

    let png = gateway.get("/photos/b.png").await;
    assert_eq!(png.content_type(), Some("image/png"));
    assert!(is_valid_png(&png.body));
}

#[tokio::test]
async fn test_addressing_is_case_insensitive() {
    let gateway = TestGateway::new();
    gateway
        .post("/Photos/Summer/Beach.PNG", create_test_png(10, 10))
        .await;

    let response = gateway.get("/photos/SUMMER/beach.png").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(gateway.store.document("beach.png", "photos,summer").await.is_some());
}

#[tokio::test]
async fn test_folders_are_part_of_the_key() {
    let gateway = TestGateway::new();
    gateway.post("/a/cat.png", create_test_png(10, 10)).await;

    assert_eq!(gateway.get("/b/cat.png").await.status, StatusCode::NOT_FOUND);
    assert_eq!(gateway.get("/cat.png").await.status, StatusCode::NOT_FOUND);
    assert_eq!(gateway.get("/a/cat.png").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_percent_encoded_path() {
    let gateway = TestGateway::new();
    gateway
        .post("/My%20Album/Cat.png", create_test_png(12, 12))
        .await;

    assert!(gateway.store.document("cat.png", "my album").await.is_some());

    let response = gateway.get("/my%20album/CAT.PNG").await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_percent_encoding_is_bad_request() {
    let gateway = TestGateway::new();

    let response = gateway.get("/photos/%FF.png").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(gateway.store.find_count(), 0);
}

#[tokio::test]
async fn test_favicon_is_empty_without_lookup() {
    let gateway = TestGateway::new();

    let response = gateway.get("/favicon.ico").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.is_empty());
    assert_eq!(gateway.store.find_count(), 0);
}

// =============================================================================
// Variants
// =============================================================================

#[tokio::test]
async fn test_fit_within_variant() {
    let gateway = TestGateway::new();
    gateway.post("/photos/wide.png", create_test_png(200, 100)).await;

    let response = gateway.get("/photos/wide__50x50.png").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(is_valid_png(&response.body));
    assert_eq!(response.image_dimensions(), (50, 25));
}

#[tokio::test]
async fn test_cover_crop_variant() {
    let gateway = TestGateway::new();
    gateway.post("/photos/wide.jpg", create_test_jpeg(200, 100)).await;

    let response = gateway.get("/photos/wide__40z40.jpg").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(is_valid_jpeg(&response.body));
    assert_eq!(response.image_dimensions(), (40, 40));
}

#[tokio::test]
async fn test_variant_with_single_bound() {
    let gateway = TestGateway::new();
    gateway.post("/photos/wide.png", create_test_png(200, 100)).await;

    let response = gateway.get("/photos/wide__100x.png").await;
    assert_eq!(response.image_dimensions(), (100, 50));

    let response = gateway.get("/photos/wide__x20.png").await;
    assert_eq!(response.image_dimensions(), (40, 20));
}

#[tokio::test]
async fn test_variant_does_not_touch_stored_document() {
    let gateway = TestGateway::new();
    gateway.post("/photos/wide.png", create_test_png(200, 100)).await;
    let before = gateway.store.document("wide.png", "photos").await.unwrap();

    gateway.get("/photos/wide__20x20.png").await;

    let after = gateway.store.document("wide.png", "photos").await.unwrap();
    assert_eq!(before, after);
    assert_eq!(gateway.store.save_count(), 1);
}

#[tokio::test]
async fn test_variant_of_missing_image_is_404() {
    let gateway = TestGateway::new();

    let response = gateway.get("/photos/ghost__10x10.png").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body.is_empty());
}

#[tokio::test]
async fn test_transparent_png_variant() {
    let gateway = TestGateway::new();
    gateway.post("/icons/dot.png", create_test_rgba_png(30, 30)).await;

    let response = gateway.get("/icons/dot__10x10.png").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(is_valid_png(&response.body));
    assert_eq!(response.image_dimensions(), (10, 10));
}

#[tokio::test]
async fn test_huge_variant_is_rejected_and_server_keeps_serving() {
    let gateway = TestGateway::new();
    gateway.post("/pic.png", create_test_png(2, 2)).await;

    let fit = gateway.get("/pic__200000x200000.png").await;
    assert_eq!(fit.status, StatusCode::BAD_REQUEST);
    assert!(fit.text().contains("limit"));

    let cover = gateway.get("/pic__200000z200000.png").await;
    assert_eq!(cover.status, StatusCode::BAD_REQUEST);

    assert!(!gateway.cache.path().join("pic__200000x200000.png").exists());
    assert!(!gateway.cache.path().join("pic__200000z200000.png").exists());

    let original = gateway.get("/pic.png").await;
    assert_eq!(original.status, StatusCode::OK);
    assert_eq!(original.image_dimensions(), (2, 2));
}

#[tokio::test]
async fn test_cover_crop_of_thin_image_counts_scaled_size() {
    let gateway = TestGateway::new();
    gateway.post("/strip.png", create_test_png(1, 1000)).await;

    // Output is 1000x1000 but the source must first grow to 1000x1000000
    let response = gateway.get("/strip__1000z1000.png").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = gateway.get("/strip__10z10.png").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.image_dimensions(), (10, 10));
}

// =============================================================================
// Service Endpoints
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let gateway = TestGateway::new();

    let response = gateway.get("/_health").await;
    assert_eq!(response.status, StatusCode::OK);

    let json: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_store_outage_is_server_error() {
    let cache = TempDir::new().unwrap();
    let router = failing_router(&cache);

    let request = axum::http::Request::get("/photos/cat.png")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = send(&router, request).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.text().contains("connection refused"));
}
