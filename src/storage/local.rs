//! Filesystem storage rooted at the output directory.

use super::Storage;
use crate::error::{Result, YtDocsError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Local filesystem storage.
///
/// Relative paths are resolved against `root`; absolute paths are used as
/// given. Stored locations are reported as absolute paths.
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    /// Create a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn full_path(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        let joined = if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.root.join(p)
        };
        std::path::absolute(&joined).unwrap_or(joined)
    }

    async fn create_parent(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.full_path(path)).await?)
    }

    async fn read_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.full_path(path);
        tokio::fs::read(&full)
            .await
            .map_err(|e| YtDocsError::Storage(format!("{}: {}", full.display(), e)))
    }

    async fn write_text(&self, path: &str, content: &str) -> Result<String> {
        let full = self.full_path(path);
        Self::create_parent(&full).await?;
        tokio::fs::write(&full, content).await?;
        debug!("Wrote {}", full.display());
        Ok(full.to_string_lossy().to_string())
    }

    async fn upload_file(&self, local: &Path, target: &str, _content_type: &str) -> Result<String> {
        let full = self.full_path(target);
        Self::create_parent(&full).await?;
        tokio::fs::copy(local, &full).await?;
        debug!("Copied {} to {}", local.display(), full.display());
        Ok(full.to_string_lossy().to_string())
    }

    async fn ensure_directory(&self, path: &str) -> Result<()> {
        tokio::fs::create_dir_all(self.full_path(path)).await?;
        Ok(())
    }

    fn resolve(&self, path: &str) -> String {
        self.full_path(path).to_string_lossy().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_and_read_text() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        let stored = storage
            .write_text("summary-files/a.md", "hello")
            .await
            .unwrap();

        assert!(Path::new(&stored).is_absolute());
        assert!(storage.exists("summary-files/a.md").await.unwrap());
        assert!(storage.exists(&stored).await.unwrap());
        assert_eq!(storage.read_text("summary-files/a.md").await.unwrap(), "hello");
        assert_eq!(storage.resolve("summary-files/a.md"), stored);
    }

    #[tokio::test]
    async fn test_upload_file() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src.bin");
        std::fs::write(&src, b"\x00\x01").unwrap();
        let storage = LocalStorage::new(dir.path().join("out"));

        let stored = storage
            .upload_file(&src, "video-files/v.mp4", "video/mp4")
            .await
            .unwrap();

        assert_eq!(std::fs::read(stored).unwrap(), b"\x00\x01");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        assert!(!storage.exists("nope.txt").await.unwrap());
        assert!(storage.read_bytes("nope.txt").await.is_err());
    }
}
