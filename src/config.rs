//! Configuration management for the image gateway.
//!
//! This module provides:
//! - Command-line arguments via clap
//! - Environment variables with `IMG_` prefix
//! - Sensible defaults for all optional settings
//! - [`GatewayConfig`], the immutable subset the image service is built from
//!
//! # Example
//!
//! ```ignore
//! use image_gateway::config::Config;
//!
//! let config = Config::parse();
//! config.validate()?;
//!
//! let gateway = config.gateway_config();
//! println!("Caching under {}", gateway.cache_root.display());
//! ```
//!
//! # Environment Variables
//!
//! - `IMG_HOST` - Server bind address (default: 0.0.0.0)
//! - `IMG_PORT` - Server port (default: 8080)
//! - `IMG_CACHE_ROOT` - Root of the rendered-image cache tree (default: cache)
//! - `IMG_STORED_WIDTH` - Max width of stored originals, 0 = unbounded
//! - `IMG_STORED_HEIGHT` - Max height of stored originals, 0 = unbounded
//! - `IMG_STORE_DIR` - Directory for the on-disk document store (default: in-memory)
//! - `IMG_STORE_POOL_SIZE` - Concurrent store sessions (default: 16)
//! - `IMG_MAX_UPLOAD_BYTES` - Largest accepted upload body (default: 32 MiB)
//! - `IMG_MAX_VARIANT_PIXELS` - Largest buffer a resize may allocate (default: 40 MP)
//! - `IMG_CORS_ORIGINS` - Allowed CORS origins, comma-separated (default: any)

use std::path::PathBuf;

use clap::Parser;

use crate::store::DEFAULT_POOL_SIZE;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default cache root, relative to the working directory.
pub const DEFAULT_CACHE_ROOT: &str = "cache";

/// Default upload body limit (32 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Default pixel budget for one resized variant (40 megapixels).
pub const DEFAULT_MAX_VARIANT_PIXELS: u64 = 40_000_000;

// =============================================================================
// Gateway Configuration
// =============================================================================

/// Upper bound applied to originals at upload time. A zero axis is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoredSize {
    pub width: u32,
    pub height: u32,
}

impl StoredSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether an image of this size must be shrunk before it is stored.
    pub fn is_exceeded_by(&self, width: u32, height: u32) -> bool {
        (self.width > 0 && width > self.width) || (self.height > 0 && height > self.height)
    }
}

/// Settings the image service needs, fixed for the life of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Root of the rendered-image cache tree
    pub cache_root: PathBuf,

    /// Maximum size of stored originals
    pub stored_size: StoredSize,

    /// Largest pixel count a variant may need while being resized
    pub max_variant_pixels: u64,
}

impl GatewayConfig {
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
            stored_size: StoredSize::default(),
            max_variant_pixels: DEFAULT_MAX_VARIANT_PIXELS,
        }
    }

    /// Bound stored originals to `width × height`.
    pub fn with_stored_size(mut self, width: u32, height: u32) -> Self {
        self.stored_size = StoredSize::new(width, height);
        self
    }

    /// Refuse variants whose resize needs more than `pixels` pixels.
    pub fn with_max_variant_pixels(mut self, pixels: u64) -> Self {
        self.max_variant_pixels = pixels;
        self
    }
}

// =============================================================================
// CLI Arguments
// =============================================================================

/// Image Gateway - store images and serve resized variants.
///
/// Upload with `POST /{folders...}/{name}.{ext}`, fetch with
/// `GET /{folders...}/{name}[__WxH|__WzH].{ext}`.
#[derive(Parser, Debug, Clone)]
#[command(name = "image-gateway")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "IMG_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "IMG_PORT")]
    pub port: u16,

    /// Largest accepted upload body in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES, env = "IMG_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: usize,

    // =========================================================================
    // Image Configuration
    // =========================================================================
    /// Root directory of the rendered-image cache tree.
    #[arg(long, default_value = DEFAULT_CACHE_ROOT, env = "IMG_CACHE_ROOT")]
    pub cache_root: PathBuf,

    /// Maximum width of stored originals (0 = unbounded).
    #[arg(long, default_value_t = 0, env = "IMG_STORED_WIDTH")]
    pub stored_width: u32,

    /// Maximum height of stored originals (0 = unbounded).
    #[arg(long, default_value_t = 0, env = "IMG_STORED_HEIGHT")]
    pub stored_height: u32,

    /// Largest pixel count a resized variant may allocate.
    ///
    /// Requests whose directive needs more are rejected with 400.
    #[arg(long, default_value_t = DEFAULT_MAX_VARIANT_PIXELS, env = "IMG_MAX_VARIANT_PIXELS")]
    pub max_variant_pixels: u64,

    // =========================================================================
    // Store Configuration
    // =========================================================================
    /// Directory of the on-disk document store.
    ///
    /// If not specified, documents are kept in memory and lost on restart.
    #[arg(long, env = "IMG_STORE_DIR")]
    pub store_dir: Option<PathBuf>,

    /// Number of concurrent document store sessions.
    #[arg(long, default_value_t = DEFAULT_POOL_SIZE, env = "IMG_STORE_POOL_SIZE")]
    pub store_pool_size: usize,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "IMG_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.cache_root.as_os_str().is_empty() {
            return Err("cache_root must not be empty. Set --cache-root or IMG_CACHE_ROOT".to_string());
        }

        if self.store_pool_size == 0 {
            return Err("store_pool_size must be greater than 0".to_string());
        }

        if self.max_variant_pixels == 0 {
            return Err("max_variant_pixels must be greater than 0".to_string());
        }

        if self.max_upload_bytes == 0 {
            return Err("max_upload_bytes must be greater than 0".to_string());
        }

        if let Some(ref dir) = self.store_dir {
            if dir.as_os_str().is_empty() {
                return Err("store_dir must not be empty when set".to_string());
            }
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The immutable settings handed to the image service.
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig::new(self.cache_root.clone())
            .with_stored_size(self.stored_width, self.stored_height)
            .with_max_variant_pixels(self.max_variant_pixels)
    }
}

// =============================================================================
// Tests
// =============================================================================
