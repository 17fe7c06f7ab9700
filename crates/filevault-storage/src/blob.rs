//! Content blob store: immutable payloads addressed by [`BlobId`].

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures::stream::StreamExt;
use sha2::{Digest, Sha256};
use tracing::debug;

use filevault_core::error::AppError;
use filevault_core::result::AppResult;
use filevault_core::traits::storage::{ByteStream, StorageProvider};
use filevault_core::types::BlobId;

/// What a successful [`BlobStore::put_stream`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobReceipt {
    /// Handle under which the bytes are now readable.
    pub blob_id: BlobId,
    /// Number of bytes stored.
    pub size_bytes: u64,
    /// Hex-encoded SHA-256 of the bytes.
    pub checksum_sha256: String,
}

/// Writes each payload once under a fresh handle and never mutates it.
///
/// No deduplication is attempted: two identical uploads get two blobs.
#[derive(Debug, Clone)]
pub struct BlobStore {
    provider: Arc<dyn StorageProvider>,
    max_blob_size: u64,
}

impl BlobStore {
    /// Wrap a provider, rejecting payloads larger than `max_blob_size` bytes.
    pub fn new(provider: Arc<dyn StorageProvider>, max_blob_size: u64) -> Self {
        Self {
            provider,
            max_blob_size,
        }
    }

    /// Name of the backing provider.
    pub fn provider_type(&self) -> &str {
        self.provider.provider_type()
    }

    /// Storage path for a blob handle, fanned out by its last two hex digits.
    pub fn blob_path(blob_id: &BlobId) -> String {
        let simple = blob_id.as_uuid().simple().to_string();
        format!("{}/{}", &simple[simple.len() - 2..], simple)
    }

    /// Stream a payload into a new blob.
    ///
    /// The blob becomes readable only after the whole stream was consumed
    /// and stored. On any error, including an oversize payload, nothing is
    /// left behind.
    pub async fn put_stream(&self, stream: ByteStream) -> AppResult<BlobReceipt> {
        let blob_id = BlobId::new();
        let path = Self::blob_path(&blob_id);

        let hasher = Arc::new(Mutex::new(Sha256::new()));
        let seen = Arc::new(AtomicU64::new(0));
        let limit = self.max_blob_size;

        let metered: ByteStream = {
            let hasher = Arc::clone(&hasher);
            let seen = Arc::clone(&seen);
            Box::pin(stream.map(move |chunk| {
                let chunk = chunk?;
                let len = chunk.len() as u64;
                let total = seen.fetch_add(len, Ordering::Relaxed) + len;
                if total > limit {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "payload exceeds the configured upload limit",
                    ));
                }
                match hasher.lock() {
                    Ok(mut h) => h.update(&chunk),
                    Err(_) => return Err(io::Error::other("checksum state poisoned")),
                }
                Ok(chunk)
            }))
        };

        let written = match self.provider.write_stream(&path, metered).await {
            Ok(written) => written,
            Err(err) if seen.load(Ordering::Relaxed) > limit => {
                debug!(%blob_id, limit, "Rejected oversize blob");
                return Err(AppError::invalid_argument(format!(
                    "Upload exceeds maximum size of {limit} bytes"
                ))
                .with_cause(err));
            }
            Err(err) => return Err(err),
        };

        let digest = {
            let mut guard = hasher
                .lock()
                .map_err(|_| AppError::internal("checksum state poisoned"))?;
            std::mem::take(&mut *guard).finalize()
        };

        debug!(%blob_id, bytes = written, provider = self.provider_type(), "Stored blob");

        Ok(BlobReceipt {
            blob_id,
            size_bytes: written,
            checksum_sha256: format!("{digest:x}"),
        })
    }

    /// Open a blob for streaming. Yields exactly the bytes that were stored.
    pub async fn open(&self, blob_id: &BlobId) -> AppResult<ByteStream> {
        self.provider.read(&Self::blob_path(blob_id)).await
    }

    /// Remove a blob. Removing a missing blob succeeds.
    pub async fn delete(&self, blob_id: &BlobId) -> AppResult<()> {
        self.provider.delete(&Self::blob_path(blob_id)).await
    }

    /// Check the backing provider.
    pub async fn health_check(&self) -> AppResult<bool> {
        self.provider.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MemoryStorageProvider;
    use bytes::Bytes;
    use filevault_core::error::ErrorKind;

    fn once(data: &'static str) -> ByteStream {
        Box::pin(futures::stream::once(async move { Ok(Bytes::from(data)) }))
    }

    fn store(limit: u64) -> (Arc<MemoryStorageProvider>, BlobStore) {
        let provider = Arc::new(MemoryStorageProvider::new());
        let store = BlobStore::new(provider.clone(), limit);
        (provider, store)
    }

    #[tokio::test]
    async fn test_put_open_roundtrip() {
        let (_provider, store) = store(1024);
        let receipt = store.put_stream(once("hello")).await.unwrap();
        assert_eq!(receipt.size_bytes, 5);
        assert_eq!(
            receipt.checksum_sha256,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );

        let mut stream = store.open(&receipt.blob_id).await.unwrap();
        let mut out = Vec::new();
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(out, b"hello");
    }

    #[tokio::test]
    async fn test_identical_payloads_get_distinct_handles() {
        let (provider, store) = store(1024);
        let a = store.put_stream(once("same")).await.unwrap();
        let b = store.put_stream(once("same")).await.unwrap();
        assert_ne!(a.blob_id, b.blob_id);
        assert_eq!(a.checksum_sha256, b.checksum_sha256);
        assert_eq!(provider.len(), 2);
    }

    #[tokio::test]
    async fn test_oversize_rejected_and_invisible() {
        let (provider, store) = store(4);
        let err = store.put_stream(once("too large")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert!(provider.is_empty());
    }

    #[tokio::test]
    async fn test_delete_then_open_fails() {
        let (provider, store) = store(1024);
        let receipt = store.put_stream(once("bye")).await.unwrap();
        store.delete(&receipt.blob_id).await.unwrap();
        assert!(provider.is_empty());
        let Err(err) = store.open(&receipt.blob_id).await else {
            panic!("deleted blob should not open");
        };
        assert_eq!(err.kind, ErrorKind::NotFound);
        // Deleting again is fine.
        store.delete(&receipt.blob_id).await.unwrap();
    }

    #[test]
    fn test_blob_path_layout() {
        let id = BlobId::new();
        let path = BlobStore::blob_path(&id);
        let simple = id.as_uuid().simple().to_string();
        assert!(path.ends_with(&simple));
        assert_eq!(path.len(), simple.len() + 3);
    }
}
