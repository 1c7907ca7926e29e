use std::borrow::Cow;
use std::io::Write;

use bytes::Bytes;
use image::ImageFormat;
use tracing::{debug, info, warn};

use crate::cache::CacheWriter;
use crate::config::{GatewayConfig, StoredSize};
use crate::error::{CacheError, GatewayError};
use crate::imaging::{self, format_tag, ImageCodec};
use crate::request::{parse_directive, resolve, ResizeMode, SizeDirective};
use crate::store::{Document, DocumentStore, StorePool};

/// Leaf name browsers ask for on their own; answered empty without touching the store.
pub const FAVICON_NAME: &str = "favicon.ico";

// =============================================================================
// Results
// =============================================================================

/// Body produced for a fetch.
#[derive(Debug, Clone, Default)]
pub struct Rendered {
    /// Exact bytes sent to the client and mirrored into the cache
    pub body: Bytes,

    /// Content type recorded on the document, if any
    pub content_type: Option<String>,
}

impl Rendered {
    /// An empty response.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Outcome of an upload.
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub name: String,
    pub path: String,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,

    /// Whether the upload was shrunk to the stored-size bound
    pub downsized: bool,

    /// Size of the stored encoding
    pub bytes: usize,
}

// =============================================================================
// Image Service
// =============================================================================

/// Serves stored images and their resized variants.
///
/// # Example
///
/// ```ignore
/// use image_gateway::config::GatewayConfig;
/// use image_gateway::gateway::ImageService;
/// use image_gateway::store::{MemoryStore, StorePool};
///
/// let service = ImageService::new(
///     StorePool::new(MemoryStore::new()),
///     GatewayConfig::new("/var/cache/images").with_stored_size(2048, 2048),
/// );
///
/// service.store("/gallery/beach.jpg", upload, None).await?;
/// let thumb = service.fetch("/gallery/beach__200z200.jpg").await?;
/// ```
pub struct ImageService<S: DocumentStore> {
    pool: StorePool<S>,
    cache: CacheWriter,
    codec: ImageCodec,
    stored_size: StoredSize,
    max_variant_pixels: u64,
}

impl<S: DocumentStore> ImageService<S> {
    pub fn new(pool: StorePool<S>, config: GatewayConfig) -> Self {
        Self {
            pool,
            cache: CacheWriter::new(config.cache_root),
            codec: ImageCodec::new(),
            stored_size: config.stored_size,
            max_variant_pixels: config.max_variant_pixels,
        }
    }

    /// The store session pool.
    pub fn pool(&self) -> &StorePool<S> {
        &self.pool
    }

    /// The cache writer.
    pub fn cache(&self) -> &CacheWriter {
        &self.cache
    }

    /// Render the response for a GET of `request_path`.
    ///
    /// `request_path` is the decoded URL path, size directive included; it
    /// doubles as the cache file location.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::NotFound`] if no document matches
    /// - [`GatewayError::Cache`] if the cache file cannot be prepared
    /// - [`GatewayError::Codec`] if the stored bytes cannot be decoded or the
    ///   variant cannot be encoded
    pub async fn fetch(&self, request_path: &str) -> Result<Rendered, GatewayError> {
        let resolved = resolve(request_path);
        if resolved.name == FAVICON_NAME {
            return Ok(Rendered::empty());
        }

        let (name, directive) = parse_directive(&resolved.name);

        let document = {
            let session = self.pool.acquire().await?;
            session.find(&name, &resolved.path).await?
        };

        debug!(
            name = %name,
            path = %resolved.path,
            directive = ?directive,
            stored_bytes = document.binary.len(),
            "Rendering image"
        );

        let cache = self.cache.clone();
        let codec = self.codec.clone();
        let cache_key = request_path.to_string();
        let binary = document.binary;
        let max_pixels = self.max_variant_pixels;

        let body = tokio::task::spawn_blocking(move || {
            render(&cache, &codec, &cache_key, &binary, directive, max_pixels)
        })
        .await??;

        Ok(Rendered {
            body,
            content_type: document.content_type,
        })
    }

    /// Decode, bound and persist an upload at `request_path`.
    ///
    /// An existing document at the same key is overwritten but keeps its
    /// content type unless `content_type` is given.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::InvalidRequest`] if the path has no file name
    /// - [`GatewayError::Upload`] if the body is not a readable image
    /// - [`GatewayError::Codec`] if re-encoding fails
    /// - [`GatewayError::Store`] if the document cannot be saved
    pub async fn store(
        &self,
        request_path: &str,
        body: Bytes,
        content_type: Option<String>,
    ) -> Result<StoredImage, GatewayError> {
        let resolved = resolve(request_path);
        if resolved.name.is_empty() {
            return Err(GatewayError::InvalidRequest {
                message: format!("no file name in path '{}'", request_path),
            });
        }

        let session = self.pool.acquire().await?;

        let mut document = match session.find(&resolved.name, &resolved.path).await {
            Ok(existing) => existing,
            Err(e) => {
                if !e.is_not_found() {
                    warn!(
                        name = %resolved.name,
                        path = %resolved.path,
                        error = %e,
                        "Replacing unreadable document"
                    );
                }
                Document::new(resolved.name.clone(), resolved.path.clone())
            }
        };

        let codec = self.codec.clone();
        let stored_size = self.stored_size;
        let prepared =
            tokio::task::spawn_blocking(move || prepare_upload(&codec, &body, stored_size))
                .await??;

        document.binary = prepared.binary;
        if let Some(content_type) = content_type.filter(|c| !c.is_empty()) {
            document.content_type = Some(content_type);
        }

        session.save(&document).await?;

        let stored = StoredImage {
            name: document.name,
            path: document.path,
            format: prepared.format,
            width: prepared.width,
            height: prepared.height,
            downsized: prepared.downsized,
            bytes: document.binary.len(),
        };

        info!(
            name = %stored.name,
            path = %stored.path,
            format = %format_tag(stored.format),
            width = stored.width,
            height = stored.height,
            downsized = stored.downsized,
            bytes = stored.bytes,
            "Stored image"
        );

        Ok(stored)
    }
}

impl<S: DocumentStore> Clone for ImageService<S> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            cache: self.cache.clone(),
            codec: self.codec.clone(),
            stored_size: self.stored_size,
            max_variant_pixels: self.max_variant_pixels,
        }
    }
}

// =============================================================================
// Blocking Stages
// =============================================================================

/// Produce the response body, mirroring it into the cache tree.
fn render(
    cache: &CacheWriter,
    codec: &ImageCodec,
    cache_key: &str,
    binary: &[u8],
    directive: Option<SizeDirective>,
    max_pixels: u64,
) -> Result<Bytes, GatewayError> {
    let mut sink = cache.open(cache_key)?;

    match directive {
        Some(size) => {
            let decoded = codec.decode(binary)?;
            let (src_w, src_h) = decoded.dimensions();
            let pixels = imaging::working_pixels(src_w, src_h, size.width, size.height, size.mode);
            if pixels > max_pixels {
                return Err(GatewayError::VariantTooLarge {
                    width: size.width,
                    height: size.height,
                    pixels,
                    limit: max_pixels,
                });
            }
            let variant = imaging::apply(&decoded.image, size.width, size.height, size.mode);
            codec.encode(&mut sink, &variant, decoded.format)?;
        }
        None => sink.write_all(binary).map_err(|e| CacheError::Write {
            path: sink.target().display().to_string(),
            message: e.to_string(),
        })?,
    }

    Ok(sink.commit()?)
}

struct PreparedUpload {
    binary: Bytes,
    format: ImageFormat,
    width: u32,
    height: u32,
    downsized: bool,
}

fn prepare_upload(
    codec: &ImageCodec,
    body: &[u8],
    stored_size: StoredSize,
) -> Result<PreparedUpload, GatewayError> {
    let decoded = codec.decode(body).map_err(GatewayError::Upload)?;
    let (width, height) = decoded.dimensions();

    let downsized = stored_size.is_exceeded_by(width, height);
    let image = if downsized {
        Cow::Owned(imaging::apply(
            &decoded.image,
            stored_size.width,
            stored_size.height,
            ResizeMode::FitWithin,
        ))
    } else {
        Cow::Borrowed(&decoded.image)
    };

    let binary = codec.encode_to_vec(&image, decoded.format)?;

    Ok(PreparedUpload {
        binary: Bytes::from(binary),
        format: decoded.format,
        width: image.width(),
        height: image.height(),
        downsized,
    })
}
