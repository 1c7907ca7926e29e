//! In-process document store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;

use super::{Document, DocumentStore};

/// Keeps documents in a map keyed by `(path, name)`. Contents are lost on
/// restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<(String, String), Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    #[cfg(test)]
    pub(crate) async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(&self, name: &str, path: &str) -> Result<Document, StoreError> {
        self.documents
            .read()
            .await
            .get(&(path.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                name: name.to_string(),
                path: path.to_string(),
            })
    }

    async fn save(&self, document: &Document) -> Result<(), StoreError> {
        self.documents.write().await.insert(
            (document.path.clone(), document.name.clone()),
            document.clone(),
        );
        Ok(())
    }
}
