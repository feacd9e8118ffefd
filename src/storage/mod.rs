//! Artifact storage abstraction.
//!
//! Every generated file (transcripts, summaries, videos) goes through a
//! [`Storage`] so the passes that produce them can run against the local
//! filesystem or an in-memory store in tests.

mod local;
mod memory;

pub use local::LocalStorage;
pub use memory::MemoryStorage;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Trait for artifact storage backends.
///
/// Paths are plain strings: relative paths are resolved against the
/// backend's root, and every write returns the location the artifact is
/// stored at (the value recorded in the table).
#[async_trait]
pub trait Storage: Send + Sync {
    /// Check whether something is stored at `path`.
    async fn exists(&self, path: &str) -> Result<bool>;

    /// Read raw bytes.
    async fn read_bytes(&self, path: &str) -> Result<Vec<u8>>;

    /// Read UTF-8 text.
    async fn read_text(&self, path: &str) -> Result<String> {
        let bytes = self.read_bytes(path).await?;
        String::from_utf8(bytes)
            .map_err(|e| crate::error::YtDocsError::Storage(format!("{}: {}", path, e)))
    }

    /// Write text, returning the stored location.
    async fn write_text(&self, path: &str, content: &str) -> Result<String>;

    /// Copy a local file into storage, returning the stored location.
    async fn upload_file(&self, local: &Path, target: &str, content_type: &str) -> Result<String>;

    /// Make sure a directory exists (no-op for flat stores).
    async fn ensure_directory(&self, path: &str) -> Result<()>;

    /// The location `path` would be stored at, without touching the store.
    fn resolve(&self, path: &str) -> String;
}

/// Join a directory and a file name with a forward slash.
pub fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir.trim_end_matches('/'), name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join() {
        assert_eq!(join("summary-files", "a.md"), "summary-files/a.md");
        assert_eq!(join("summary-files/", "a.md"), "summary-files/a.md");
        assert_eq!(join("", "a.md"), "a.md");
    }
}
