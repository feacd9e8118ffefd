//! In-memory storage implementation.
//!
//! Useful for testing.

use super::Storage;
use crate::error::{Result, YtDocsError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

/// In-memory storage keyed by path.
pub struct MemoryStorage {
    files: RwLock<HashMap<String, Vec<u8>>>,
    writes: AtomicUsize,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            writes: AtomicUsize::new(0),
        }
    }

    /// Seed a file without counting it as a write.
    pub fn insert(&self, path: &str, bytes: impl Into<Vec<u8>>) {
        if let Ok(mut files) = self.files.write() {
            files.insert(path.to_string(), bytes.into());
        }
    }

    /// Number of `write_text`/`upload_file` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// All stored paths, sorted.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .files
            .read()
            .map(|f| f.keys().cloned().collect())
            .unwrap_or_default();
        paths.sort();
        paths
    }

    fn store(&self, path: &str, bytes: Vec<u8>) -> Result<String> {
        let mut files = self
            .files
            .write()
            .map_err(|_| YtDocsError::Storage("memory store lock poisoned".to_string()))?;
        files.insert(path.to_string(), bytes);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(path.to_string())
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn exists(&self, path: &str) -> Result<bool> {
        let files = self
            .files
            .read()
            .map_err(|_| YtDocsError::Storage("memory store lock poisoned".to_string()))?;
        Ok(files.contains_key(path))
    }

    async fn read_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let files = self
            .files
            .read()
            .map_err(|_| YtDocsError::Storage("memory store lock poisoned".to_string()))?;
        files
            .get(path)
            .cloned()
            .ok_or_else(|| YtDocsError::Storage(format!("{}: not found", path)))
    }

    async fn write_text(&self, path: &str, content: &str) -> Result<String> {
        self.store(path, content.as_bytes().to_vec())
    }

    async fn upload_file(&self, local: &Path, target: &str, _content_type: &str) -> Result<String> {
        let bytes = tokio::fs::read(local).await?;
        self.store(target, bytes)
    }

    async fn ensure_directory(&self, _path: &str) -> Result<()> {
        Ok(())
    }

    fn resolve(&self, path: &str) -> String {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_counts() {
        let storage = MemoryStorage::new();
        storage.insert("seed.txt", "x");
        assert_eq!(storage.write_count(), 0);

        let stored = storage.write_text("a.md", "hello").await.unwrap();
        assert_eq!(stored, "a.md");
        assert_eq!(storage.write_count(), 1);
        assert_eq!(storage.read_text("a.md").await.unwrap(), "hello");
        assert!(storage.exists("seed.txt").await.unwrap());
        assert!(!storage.exists("b.md").await.unwrap());
        assert_eq!(storage.paths(), vec!["a.md", "seed.txt"]);
    }

    #[test]
    fn test_missing_file_is_storage_error() {
        let storage = MemoryStorage::new();
        let err = tokio_test::block_on(storage.read_bytes("nope")).unwrap_err();
        assert!(matches!(err, YtDocsError::Storage(_)));
    }
}
