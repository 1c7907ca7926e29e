//! HTTP server layer for the image gateway.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │     GET  /{folders...}/{name}[__WxH|__WzH].{ext}                │
//! │     POST /{folders...}/{name}.{ext}                             │
//! │                                                                 │
//! │  ┌─────────────────────────┐     ┌─────────────────────────┐    │
//! │  │        handlers         │     │         routes          │    │
//! │  │ (requests, error map)   │     │  (router, middleware)   │    │
//! │  └─────────────────────────┘     └─────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    fetch_handler, health_handler, upload_handler, AppState, HandlerError, HealthResponse,
    STORED_BODY,
};
pub use routes::{create_router, RouterConfig};
