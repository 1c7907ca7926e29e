//! Router configuration for the image gateway.
//!
//! This module defines the HTTP routes and applies middleware for CORS,
//! body limits and request tracing.
//!
//! # Route Structure
//!
//! ```text
//! /_health            - Health check
//! GET  /{*path}       - Serve image or resized variant
//! POST /{*path}       - Store image
//! ```
//!
//! # Example
//!
//! ```ignore
//! use image_gateway::config::GatewayConfig;
//! use image_gateway::gateway::ImageService;
//! use image_gateway::server::{create_router, RouterConfig};
//! use image_gateway::store::{MemoryStore, StorePool};
//!
//! let service = ImageService::new(StorePool::new(MemoryStore::new()), GatewayConfig::new("cache"));
//! let router = create_router(service, RouterConfig::new());
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use http::header::CONTENT_TYPE;
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{fetch_handler, health_handler, upload_handler, AppState};
use crate::config::DEFAULT_MAX_UPLOAD_BYTES;
use crate::gateway::ImageService;
use crate::store::DocumentStore;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Largest accepted request body in bytes
    pub max_upload_bytes: usize,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterConfig {
    /// Create a router configuration.
    ///
    /// By default:
    /// - CORS allows any origin
    /// - Uploads up to 32 MiB
    /// - Tracing is enabled
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            enable_tracing: true,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Set the request body limit.
    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// Every path other than `/_health` addresses an image: GET serves it,
/// POST stores it.
pub fn create_router<S: DocumentStore>(service: ImageService<S>, config: RouterConfig) -> Router {
    let app_state = AppState::new(service);
    let cors = build_cors_layer(&config);

    let router = Router::new()
        .route("/_health", get(health_handler))
        .route("/", get(fetch_handler::<S>).post(upload_handler::<S>))
        .route(
            "/{*path}",
            get(fetch_handler::<S>).post(upload_handler::<S>),
        )
        .with_state(app_state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
