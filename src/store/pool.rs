//! Bounded session pool over a document store.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::StoreError;

use super::{Document, DocumentStore};

/// Default number of concurrent store sessions.
pub const DEFAULT_POOL_SIZE: usize = 16;

/// Hands out store sessions, at most `size` at a time.
///
/// Cloning is cheap and shares the same sessions.
pub struct StorePool<S: DocumentStore> {
    store: Arc<S>,
    permits: Arc<Semaphore>,
    size: usize,
}

impl<S: DocumentStore> StorePool<S> {
    /// Create a pool with [`DEFAULT_POOL_SIZE`] sessions.
    pub fn new(store: S) -> Self {
        Self::with_size(store, DEFAULT_POOL_SIZE)
    }

    /// Create a pool with `size` sessions (at least one).
    pub fn with_size(store: S, size: usize) -> Self {
        let size = size.max(1);
        Self {
            store: Arc::new(store),
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    /// Check out a session, waiting while all sessions are in use.
    ///
    /// The session returns to the pool when dropped.
    pub async fn acquire(&self) -> Result<Session<S>, StoreError> {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| StoreError::PoolClosed)?;

        Ok(Session {
            store: Arc::clone(&self.store),
            _permit: permit,
        })
    }

    /// Sessions currently free.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Total sessions.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}

impl<S: DocumentStore> Clone for StorePool<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            permits: Arc::clone(&self.permits),
            size: self.size,
        }
    }
}

/// A checked-out store session.
pub struct Session<S: DocumentStore> {
    store: Arc<S>,
    _permit: OwnedSemaphorePermit,
}

impl<S: DocumentStore> Session<S> {
    /// See [`DocumentStore::find`].
    pub async fn find(&self, name: &str, path: &str) -> Result<Document, StoreError> {
        self.store.find(name, path).await
    }

    /// See [`DocumentStore::save`].
    pub async fn save(&self, document: &Document) -> Result<(), StoreError> {
        self.store.save(document).await
    }
}
