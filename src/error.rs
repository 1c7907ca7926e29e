use thiserror::Error;

/// Errors raised by a document store backend or its session pool
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// No document exists for the key
    #[error("Document not found: {name} in '{path}'")]
    NotFound { name: String, path: String },

    /// Backend I/O failure (disk, network, ...)
    #[error("Store I/O error: {0}")]
    Io(String),

    /// A stored record could not be read back
    #[error("Corrupt document record: {0}")]
    Corrupt(String),

    /// The session pool was shut down
    #[error("Store session pool is closed")]
    PoolClosed,
}

impl StoreError {
    /// Whether this error means the key simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Errors from decoding and encoding images
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    /// Bytes are not a recognizable or readable image container
    #[error("Failed to decode image: {message}")]
    Decode { message: String },

    /// Target format has no encoder here (only JPEG and PNG are written)
    #[error("unknown format when writing {format}")]
    UnsupportedFormat { format: String },

    /// The encoder or the sink failed
    #[error("Failed to encode image: {message}")]
    Encode { message: String },
}

/// Errors from populating the on-disk cache tree
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// Parent directories of the cache file could not be created
    #[error("can not make cache folder")]
    CreateDir { path: String, message: String },

    /// Creating, writing or renaming the cache file failed
    #[error("Cache write failed for {path}: {message}")]
    Write { path: String, message: String },
}

/// Errors surfaced by the gateway for a single request
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// No document matches (name, path)
    #[error("Image not found: {name} in '{path}'")]
    NotFound { name: String, path: String },

    /// The request itself is unusable (bad path encoding, missing name)
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// The size directive would need a resize buffer over the pixel budget
    #[error("Requested size {width}x{height} needs {pixels} pixels, over the limit of {limit}")]
    VariantTooLarge {
        width: u32,
        height: u32,
        pixels: u64,
        limit: u64,
    },

    /// Uploaded bytes could not be decoded as an image
    #[error("{0}")]
    Upload(CodecError),

    /// Decode/encode failure while rendering a stored image
    #[error("{0}")]
    Codec(#[from] CodecError),

    /// Cache tree population failed
    #[error("{0}")]
    Cache(#[from] CacheError),

    /// Document store failure other than a missing key
    #[error("{0}")]
    Store(StoreError),

    /// A blocking render task panicked or was cancelled
    #[error("Render task failed: {message}")]
    Task { message: String },
}

impl From<StoreError> for GatewayError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { name, path } => GatewayError::NotFound { name, path },
            other => GatewayError::Store(other),
        }
    }
}

impl From<tokio::task::JoinError> for GatewayError {
    fn from(err: tokio::task::JoinError) -> Self {
        GatewayError::Task {
            message: err.to_string(),
        }
    }
}
