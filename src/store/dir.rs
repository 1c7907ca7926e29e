//! Directory-backed document store.
//!
//! Each document is one file, `root/<hh>/<sha256>.doc`, where the hash is
//! taken over `path NUL name`. The file holds a single line of JSON metadata
//! followed by the raw image bytes:
//!
//! ```text
//! {"name":"beach.jpg","path":"gallery,2024","content_type":"image/jpeg"}\n
//! <binary...>
//! ```
//!
//! Saves write a temp file in the same directory and rename it over the old
//! record, so readers only ever see a complete document.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::StoreError;

use super::{Document, DocumentStore};

const RECORD_EXTENSION: &str = "doc";

#[derive(Debug, Serialize, Deserialize)]
struct RecordHeader {
    name: String,
    path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content_type: Option<String>,
}

/// Stores documents as files under a root directory.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| {
            StoreError::Io(format!("cannot create store at {}: {}", root.display(), e))
        })?;
        Ok(Self { root })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File a document key is recorded in.
    pub fn record_path(&self, name: &str, path: &str) -> PathBuf {
        let key = record_key(name, path);
        self.root
            .join(&key[..2])
            .join(format!("{}.{}", key, RECORD_EXTENSION))
    }
}

/// Hex SHA-256 of `path NUL name`.
fn record_key(name: &str, path: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.as_bytes());
    hasher.update([0u8]);
    hasher.update(name.as_bytes());
    hex::encode(hasher.finalize())
}

fn read_record(file: &Path, name: &str, path: &str) -> Result<Document, StoreError> {
    let raw = match std::fs::read(file) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(StoreError::NotFound {
                name: name.to_string(),
                path: path.to_string(),
            })
        }
        Err(e) => return Err(StoreError::Io(e.to_string())),
    };

    let split = raw
        .iter()
        .position(|&b| b == b'\n')
        .ok_or_else(|| StoreError::Corrupt(format!("{}: missing header", file.display())))?;

    let header: RecordHeader = serde_json::from_slice(&raw[..split])
        .map_err(|e| StoreError::Corrupt(format!("{}: {}", file.display(), e)))?;

    if header.name != name || header.path != path {
        return Err(StoreError::Corrupt(format!(
            "{}: holds {}/{}, expected {}/{}",
            file.display(),
            header.path,
            header.name,
            path,
            name
        )));
    }

    let mut raw = Bytes::from(raw);
    let binary = raw.split_off(split + 1);

    Ok(Document {
        name: header.name,
        path: header.path,
        binary,
        content_type: header.content_type,
    })
}

fn write_record(file: &Path, document: &Document) -> Result<(), StoreError> {
    let io_err = |e: std::io::Error| StoreError::Io(format!("{}: {}", file.display(), e));

    let dir = file
        .parent()
        .ok_or_else(|| StoreError::Io(format!("{}: no parent directory", file.display())))?;
    std::fs::create_dir_all(dir).map_err(io_err)?;

    let header = RecordHeader {
        name: document.name.clone(),
        path: document.path.clone(),
        content_type: document.content_type.clone(),
    };
    let header = serde_json::to_vec(&header).map_err(|e| StoreError::Io(e.to_string()))?;

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    temp.write_all(&header).map_err(io_err)?;
    temp.write_all(b"\n").map_err(io_err)?;
    temp.write_all(&document.binary).map_err(io_err)?;
    temp.persist(file).map_err(|e| io_err(e.error))?;

    Ok(())
}

#[async_trait]
impl DocumentStore for DirStore {
    async fn find(&self, name: &str, path: &str) -> Result<Document, StoreError> {
        let file = self.record_path(name, path);
        let (name, path) = (name.to_string(), path.to_string());

        tokio::task::spawn_blocking(move || read_record(&file, &name, &path))
            .await
            .map_err(|e| StoreError::Io(format!("store task failed: {}", e)))?
    }

    async fn save(&self, document: &Document) -> Result<(), StoreError> {
        let file = self.record_path(&document.name, &document.path);
        let document = document.clone();

        debug!(
            name = %document.name,
            path = %document.path,
            record = %file.display(),
            "Writing document record"
        );

        tokio::task::spawn_blocking(move || write_record(&file, &document))
            .await
            .map_err(|e| StoreError::Io(format!("store task failed: {}", e)))?
    }
}
