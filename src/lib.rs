//! # Image Gateway
//!
//! An HTTP service that stores images in a document store and serves them
//! back, optionally resized, while mirroring every served body into an
//! on-disk cache tree that a static web server can answer from directly.
//!
//! ## Features
//!
//! - **Path addressing**: `/{folders...}/{name}.{ext}`, case-insensitive
//! - **Size directives**: `__WxH` fits within a box, `__WzH` fills and crops
//! - **Cache mirroring**: each response lands at `{cache_root}{request_path}`
//! - **Upload bounds**: originals above the stored size are shrunk on upload
//!
//! ## Architecture
//!
//! - [`request`] - Path resolution and size-directive parsing
//! - [`imaging`] - Decode, resize and encode
//! - [`cache`] - Atomic writes into the cache tree
//! - [`store`] - Document store trait, backends and session pool
//! - [`gateway`] - The image service tying the above together
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use image_gateway::{create_router, GatewayConfig, ImageService, MemoryStore, RouterConfig, StorePool};
//!
//! #[tokio::main]
//! async fn main() {
//!     let pool = StorePool::new(MemoryStore::new());
//!     let service = ImageService::new(pool, GatewayConfig::new("cache").with_stored_size(1920, 1080));
//!     let router = create_router(service, RouterConfig::new());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod imaging;
pub mod request;
pub mod server;
pub mod store;

// Re-export commonly used types
pub use cache::{CacheSink, CacheWriter};
pub use config::{Config, GatewayConfig, StoredSize};
pub use error::{CacheError, CodecError, GatewayError, StoreError};
pub use gateway::{ImageService, Rendered, StoredImage};
pub use imaging::{ImageCodec, JPEG_QUALITY};
pub use request::{parse_directive, resolve, ResizeMode, ResolvedPath, SizeDirective};
pub use server::{create_router, AppState, RouterConfig};
pub use store::{DirStore, Document, DocumentStore, MemoryStore, StorePool};
