//! HTTP request handlers for the image gateway.
//!
//! # Endpoints
//!
//! - `GET /{folders...}/{name}[__WxH|__WzH].{ext}` - Serve an image or variant
//! - `POST /{folders...}/{name}.{ext}` - Store an image
//! - `GET /_health` - Health check endpoint

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::error::{CacheError, GatewayError};
use crate::gateway::ImageService;
use crate::store::DocumentStore;

/// Body of a successful upload.
pub const STORED_BODY: &str = "stored\n";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the image service.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<S: DocumentStore> {
    pub service: Arc<ImageService<S>>,
}

impl<S: DocumentStore> AppState<S> {
    pub fn new(service: ImageService<S>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

impl<S: DocumentStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Wrapper for handler errors to implement IntoResponse.
///
/// Bodies are plain text. Missing images answer 404 with an empty body;
/// client mistakes get 400 and everything else 500, logged at WARN and
/// ERROR respectively.
#[derive(Debug)]
pub struct HandlerError(pub GatewayError);

impl HandlerError {
    /// Status code, error type label and body for this error.
    pub fn parts(&self) -> (StatusCode, &'static str, String) {
        match &self.0 {
            GatewayError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found", String::new()),
            GatewayError::InvalidRequest { .. } => (
                StatusCode::BAD_REQUEST,
                "invalid_request",
                self.0.to_string(),
            ),
            GatewayError::VariantTooLarge { .. } => (
                StatusCode::BAD_REQUEST,
                "variant_too_large",
                self.0.to_string(),
            ),
            GatewayError::Upload(_) => (
                StatusCode::BAD_REQUEST,
                "invalid_upload",
                self.0.to_string(),
            ),
            GatewayError::Codec(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "codec_error",
                self.0.to_string(),
            ),
            GatewayError::Cache(CacheError::CreateDir { .. }) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "cache_dir_error",
                self.0.to_string(),
            ),
            GatewayError::Cache(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "cache_error",
                self.0.to_string(),
            ),
            GatewayError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                self.0.to_string(),
            ),
            GatewayError::Task { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "task_error",
                self.0.to_string(),
            ),
        }
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let (status, error_type, body) = self.parts();

        if status.is_server_error() {
            // CreateDir hides the OS error from the client; keep it in the log
            let detail = match &self.0 {
                GatewayError::Cache(CacheError::CreateDir { path, message }) => {
                    format!("{}: {}", path, message)
                }
                other => other.to_string(),
            };
            error!(
                error_type = error_type,
                status = status.as_u16(),
                "Server error: {}",
                detail
            );
        } else if status == StatusCode::NOT_FOUND {
            debug!(
                error_type = error_type,
                status = status.as_u16(),
                "Resource not found: {}",
                self.0
            );
        } else {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                body
            );
        }

        (status, body).into_response()
    }
}

impl From<GatewayError> for HandlerError {
    fn from(err: GatewayError) -> Self {
        HandlerError(err)
    }
}

/// Percent-decode the path of a request URI.
fn decode_path(uri: &Uri) -> Result<String, HandlerError> {
    urlencoding::decode(uri.path())
        .map(|p| p.into_owned())
        .map_err(|e| {
            HandlerError(GatewayError::InvalidRequest {
                message: format!("path is not valid UTF-8 after decoding: {}", e),
            })
        })
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle image requests.
///
/// # Endpoint
///
/// `GET /{folders...}/{name}[__WxH|__WzH].{ext}`
///
/// # Response
///
/// - `200 OK`: the stored image, or the resized variant when the leaf carries
///   a size directive
/// - `400 Bad Request`: the directive asks for more pixels than allowed
/// - `404 Not Found`: no image stored under that name (empty body)
/// - `500 Internal Server Error`: decode, encode or cache failure (text body)
///
/// # Headers
///
/// - `Content-Type`: as recorded at upload, otherwise sniffed from the body
pub async fn fetch_handler<S: DocumentStore>(
    State(state): State<AppState<S>>,
    uri: Uri,
) -> Result<Response, HandlerError> {
    let path = decode_path(&uri)?;
    let rendered = state.service.fetch(&path).await?;

    let content_type = rendered
        .content_type
        .as_deref()
        .and_then(|ct| HeaderValue::from_str(ct).ok())
        .or_else(|| sniff_content_type(&rendered.body));

    let mut response = Response::new(Body::from(rendered.body));
    if let Some(content_type) = content_type {
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, content_type);
    }

    Ok(response)
}

fn sniff_content_type(body: &[u8]) -> Option<HeaderValue> {
    if body.is_empty() {
        return None;
    }
    image::guess_format(body)
        .ok()
        .map(|format| HeaderValue::from_static(format.to_mime_type()))
}

/// Handle image uploads.
///
/// # Endpoint
///
/// `POST /{folders...}/{name}.{ext}` with the raw image as body.
///
/// # Response
///
/// - `200 OK`: `stored\n`
/// - `400 Bad Request`: body is not a readable image, or no file name
/// - `413 Payload Too Large`: body over the configured limit
/// - `500 Internal Server Error`: encode or store failure
pub async fn upload_handler<S: DocumentStore>(
    State(state): State<AppState<S>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, HandlerError> {
    let path = decode_path(&uri)?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    state.service.store(&path, body, content_type).await?;

    Ok((StatusCode::OK, STORED_BODY).into_response())
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /_health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
