use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::CacheError;

// =============================================================================
// Fan-out Writer
// =============================================================================

/// Duplicates every write into two sinks.
#[derive(Debug)]
pub struct FanOut<A, B> {
    primary: A,
    mirror: B,
}

impl<A: Write, B: Write> FanOut<A, B> {
    pub fn new(primary: A, mirror: B) -> Self {
        Self { primary, mirror }
    }

    /// Split back into `(primary, mirror)`.
    pub fn into_parts(self) -> (A, B) {
        (self.primary, self.mirror)
    }
}

impl<A: Write, B: Write> Write for FanOut<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.primary.write_all(buf)?;
        self.mirror.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.primary.flush()?;
        self.mirror.flush()
    }
}

// =============================================================================
// Cache Writer
// =============================================================================

/// Opens cache sinks under a fixed root directory.
#[derive(Debug, Clone)]
pub struct CacheWriter {
    root: PathBuf,
}

impl CacheWriter {
    /// Create a writer rooted at `root`. Relative roots are made absolute
    /// against the current directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = std::path::absolute(&root).unwrap_or(root);
        Self { root }
    }

    /// The absolute cache root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Prepare a sink for `request_path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// - [`CacheError::CreateDir`] if the parent directories cannot be created
    /// - [`CacheError::Write`] if the path has no file component or the
    ///   temp file cannot be created
    pub fn open(&self, request_path: &str) -> Result<CacheSink, CacheError> {
        let relative = clean_request_path(request_path);
        let target = self.root.join(&relative);
        let parent = match (relative.as_os_str().is_empty(), target.parent()) {
            (false, Some(parent)) => parent.to_path_buf(),
            _ => {
                return Err(CacheError::Write {
                    path: request_path.to_string(),
                    message: "request path has no file component".to_string(),
                })
            }
        };

        std::fs::create_dir_all(&parent).map_err(|e| CacheError::CreateDir {
            path: parent.display().to_string(),
            message: e.to_string(),
        })?;

        let temp = temp_file_in(&parent).map_err(|e| CacheError::Write {
            path: target.display().to_string(),
            message: e.to_string(),
        })?;

        debug!(target = %target.display(), "Opened cache sink");

        Ok(CacheSink {
            target,
            out: FanOut::new(Vec::new(), BufWriter::new(temp)),
        })
    }
}

fn temp_file_in(dir: &Path) -> io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".cache-").suffix(".tmp");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o644));
    }

    builder.tempfile_in(dir)
}

/// Lexically clean a request path into a relative path.
///
/// Empty and `.` segments are dropped; `..` removes the previous segment and
/// is ignored at the top, so the result never climbs above the cache root.
pub fn clean_request_path(request_path: &str) -> PathBuf {
    let mut segments: Vec<&str> = Vec::new();
    for segment in request_path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.iter().collect()
}

// =============================================================================
// Cache Sink
// =============================================================================

/// Write side of one cached response.
///
/// Bytes go to the response buffer and a temp file next to the target. The
/// file only appears at the target on [`CacheSink::commit`]; dropping the
/// sink discards it.
#[derive(Debug)]
pub struct CacheSink {
    target: PathBuf,
    out: FanOut<Vec<u8>, BufWriter<NamedTempFile>>,
}

impl CacheSink {
    /// Final location of the cache file.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Move the cache file into place and hand back the response body.
    pub fn commit(self) -> Result<Bytes, CacheError> {
        let target = self.target;
        let write_error = |message: String| CacheError::Write {
            path: target.display().to_string(),
            message,
        };

        let (body, file) = self.out.into_parts();
        let file = file
            .into_inner()
            .map_err(|e| write_error(e.into_error().to_string()))?;
        file.persist(&target)
            .map_err(|e| write_error(e.error.to_string()))?;

        debug!(target = %target.display(), bytes = body.len(), "Committed cache file");

        Ok(Bytes::from(body))
    }
}

impl Write for CacheSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.out.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
