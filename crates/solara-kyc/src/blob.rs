//! # Blob Store Adapter
//!
//! Persists raw file bytes keyed by an opaque [`StorageKey`]. The blob
//! store is an external collaborator: it is never queried for metadata,
//! and its errors never cross this boundary verbatim — the mediator
//! translates them into the [`crate::KycError`] taxonomy.
//!
//! Two implementations ship in-tree: an in-memory map for tests and a
//! filesystem store for the development server. Object storage slots in
//! behind the same trait.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

use solara_core::StorageKey;

/// Failures at the blob storage boundary.
///
/// Internal to the storage seam. `Missing` becomes a storage
/// inconsistency when the registry still holds the key; `Io` details are
/// logged, never surfaced.
#[derive(Error, Debug)]
pub enum BlobError {
    /// No blob is bound to the key.
    #[error("no blob for {0}")]
    Missing(StorageKey),

    /// The underlying storage failed.
    #[error("blob storage error: {0}")]
    Io(String),
}

/// Byte storage keyed by opaque storage keys, with range support for
/// streaming.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Bind the full byte payload to a key.
    async fn put(&self, key: StorageKey, bytes: Vec<u8>) -> Result<(), BlobError>;

    /// Fetch the full payload for a key.
    async fn get(&self, key: StorageKey) -> Result<Vec<u8>, BlobError>;

    /// Fetch the inclusive byte range `start..=end` of the payload.
    /// `end` beyond the payload is clamped by the implementation.
    async fn get_range(&self, key: StorageKey, start: u64, end: u64) -> Result<Vec<u8>, BlobError>;

    /// Release the payload bound to a key. Deleting an unbound key is
    /// not an error — deletion is idempotent.
    async fn delete(&self, key: StorageKey) -> Result<(), BlobError>;
}

/// Blob storage held in process memory.
#[derive(Default)]
pub struct InMemoryBlobStore {
    blobs: Mutex<HashMap<StorageKey, Vec<u8>>>,
}

impl InMemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<StorageKey, Vec<u8>>>, BlobError> {
        self.blobs
            .lock()
            .map_err(|_| BlobError::Io("blob store lock poisoned".to_string()))
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, key: StorageKey, bytes: Vec<u8>) -> Result<(), BlobError> {
        self.lock()?.insert(key, bytes);
        Ok(())
    }

    async fn get(&self, key: StorageKey) -> Result<Vec<u8>, BlobError> {
        self.lock()?
            .get(&key)
            .cloned()
            .ok_or(BlobError::Missing(key))
    }

    async fn get_range(&self, key: StorageKey, start: u64, end: u64) -> Result<Vec<u8>, BlobError> {
        let guard = self.lock()?;
        let bytes = guard.get(&key).ok_or(BlobError::Missing(key))?;
        Ok(slice_range(bytes, start, end))
    }

    async fn delete(&self, key: StorageKey) -> Result<(), BlobError> {
        self.lock()?.remove(&key);
        Ok(())
    }
}

/// Blob storage rooted in a local directory, one file per key.
///
/// Backs the development server. Keys map to flat file names under the
/// root; the key being a fresh UUID per upload keeps names collision-free.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Create a store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: StorageKey) -> PathBuf {
        self.root.join(format!("{}.blob", key.as_uuid()))
    }

    fn io(e: std::io::Error) -> BlobError {
        BlobError::Io(e.to_string())
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, key: StorageKey, bytes: Vec<u8>) -> Result<(), BlobError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(Self::io)?;
        tokio::fs::write(self.path_for(key), bytes)
            .await
            .map_err(Self::io)
    }

    async fn get(&self, key: StorageKey) -> Result<Vec<u8>, BlobError> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(BlobError::Missing(key)),
            Err(e) => Err(Self::io(e)),
        }
    }

    async fn get_range(&self, key: StorageKey, start: u64, end: u64) -> Result<Vec<u8>, BlobError> {
        let bytes = self.get(key).await?;
        Ok(slice_range(&bytes, start, end))
    }

    async fn delete(&self, key: StorageKey) -> Result<(), BlobError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io(e)),
        }
    }
}

/// Slice the inclusive range `start..=end`, clamped to the payload.
fn slice_range(bytes: &[u8], start: u64, end: u64) -> Vec<u8> {
    let len = bytes.len() as u64;
    if start >= len {
        return Vec::new();
    }
    let end = end.min(len.saturating_sub(1));
    bytes[start as usize..=end as usize].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_put_get_roundtrip() {
        let store = InMemoryBlobStore::new();
        let key = StorageKey::new();
        store.put(key, b"payload".to_vec()).await.unwrap();
        assert_eq!(store.get(key).await.unwrap(), b"payload");
    }

    #[tokio::test]
    async fn test_memory_missing_key() {
        let store = InMemoryBlobStore::new();
        let key = StorageKey::new();
        assert!(matches!(
            store.get(key).await.unwrap_err(),
            BlobError::Missing(k) if k == key
        ));
    }

    #[tokio::test]
    async fn test_memory_range_clamped() {
        let store = InMemoryBlobStore::new();
        let key = StorageKey::new();
        store.put(key, b"0123456789".to_vec()).await.unwrap();

        assert_eq!(store.get_range(key, 2, 5).await.unwrap(), b"2345");
        assert_eq!(store.get_range(key, 8, 100).await.unwrap(), b"89");
        assert!(store.get_range(key, 50, 60).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_memory_delete_is_idempotent() {
        let store = InMemoryBlobStore::new();
        let key = StorageKey::new();
        store.put(key, b"x".to_vec()).await.unwrap();
        store.delete(key).await.unwrap();
        store.delete(key).await.unwrap();
        assert!(store.get(key).await.is_err());
    }

    #[tokio::test]
    async fn test_fs_put_get_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        let key = StorageKey::new();

        store.put(key, b"file payload".to_vec()).await.unwrap();
        assert_eq!(store.get(key).await.unwrap(), b"file payload");
        assert_eq!(store.get_range(key, 5, 11).await.unwrap(), b"payload");

        store.delete(key).await.unwrap();
        assert!(matches!(
            store.get(key).await.unwrap_err(),
            BlobError::Missing(_)
        ));
    }
}
