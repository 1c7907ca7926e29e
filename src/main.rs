//! Image Gateway - store images and serve resized variants.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use image_gateway::{
    config::Config,
    gateway::ImageService,
    server::{create_router, RouterConfig},
    store::{DirStore, DocumentStore, MemoryStore, StorePool},
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    // Initialize logging
    init_logging(config.verbose);

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Image Gateway v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    if config.stored_width == 0 && config.stored_height == 0 {
        info!("  Stored size: unbounded");
    } else {
        info!(
            "  Stored size: {}x{} (0 = unbounded)",
            config.stored_width, config.stored_height
        );
    }
    info!(
        "  Upload limit: {}MB",
        config.max_upload_bytes / (1024 * 1024)
    );
    info!("  Variant limit: {} pixels", config.max_variant_pixels);

    match config.store_dir.clone() {
        Some(dir) => match DirStore::open(&dir) {
            Ok(store) => {
                info!("  Store: directory {}", store.root().display());
                serve(config, store).await
            }
            Err(e) => {
                error!("Failed to open store at {}: {}", dir.display(), e);
                ExitCode::FAILURE
            }
        },
        None => {
            warn!("  Store: in-memory, documents are lost on restart");
            warn!("         Persist with --store-dir=<dir>");
            serve(config, MemoryStore::new()).await
        }
    }
}

/// Build the service around `store` and run the server until it fails.
async fn serve<S: DocumentStore>(config: Config, store: S) -> ExitCode {
    let pool = StorePool::with_size(store, config.store_pool_size);
    let service = ImageService::new(pool, config.gateway_config());
    info!("  Cache root: {}", service.cache().root().display());
    info!("  Store sessions: {}", service.pool().size());
    let router = create_router(service, build_router_config(&config));

    let addr = config.bind_address();

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Store an image:");
    info!("    curl --data-binary @photo.jpg http://{}/photos/photo.jpg", addr);
    info!("");
    info!("  Fetch a resized variant:");
    info!("    curl -o thumb.jpg http://{}/photos/photo__200z200.jpg", addr);
    info!("────────────────────────────────────────────────────────────────");
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "image_gateway=debug,tower_http=debug"
    } else {
        "image_gateway=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application Config.
fn build_router_config(config: &Config) -> RouterConfig {
    let mut router_config = RouterConfig::new().with_max_upload_bytes(config.max_upload_bytes);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config.with_tracing(!config.no_tracing)
}
