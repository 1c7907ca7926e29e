//! Document store abstraction.
//!
//! The gateway treats persistence as a black-box key-value store: find a
//! document by `(name, path)` and upsert it. Access goes through a
//! [`StorePool`], which hands out one [`Session`] per request and takes it
//! back when the session is dropped.
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │                 StorePool                  │
//! │    (bounded sessions, scoped release)      │
//! └─────────────────────┬──────────────────────┘
//!                       │ acquire()
//!                       ▼
//! ┌────────────────────────────────────────────┐
//! │          DocumentStore trait               │
//! └─────────────────────┬──────────────────────┘
//!           ┌───────────┴───────────┐
//!           ▼                       ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  MemoryStore    │     │    DirStore      │
//! │  (in-process)   │     │  (on-disk files) │
//! └─────────────────┘     └──────────────────┘
//! ```

mod dir;
mod memory;
mod pool;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StoreError;

pub use dir::DirStore;
pub use memory::MemoryStore;
pub use pool::{Session, StorePool, DEFAULT_POOL_SIZE};

// =============================================================================
// Document
// =============================================================================

/// A stored image and its key.
///
/// `binary` is always the canonical upload-time encoding. Resized variants
/// are rendered per request and never written back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Lower-cased leaf filename without any size directive
    pub name: String,

    /// Lower-cased comma-joined folder segments
    pub path: String,

    /// Encoded image bytes
    pub binary: Bytes,

    /// Content type recorded from the last upload that sent one
    pub content_type: Option<String>,
}

impl Document {
    /// Create an empty document for a key.
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            binary: Bytes::new(),
            content_type: None,
        }
    }

    /// Set the image bytes.
    pub fn with_binary(mut self, binary: impl Into<Bytes>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Set the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

// =============================================================================
// DocumentStore Trait
// =============================================================================

/// Persistence backend for documents.
///
/// Implementations own their consistency; the gateway adds no locking.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Look up a document by key.
    ///
    /// Returns [`StoreError::NotFound`] when no document matches.
    async fn find(&self, name: &str, path: &str) -> Result<Document, StoreError>;

    /// Insert or replace the document with the same `(name, path)`.
    async fn save(&self, document: &Document) -> Result<(), StoreError>;
}
