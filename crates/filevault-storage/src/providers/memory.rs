//! In-memory storage provider for tests and ephemeral stores.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use dashmap::DashMap;
use futures::stream::StreamExt;
use tracing::debug;

use filevault_core::error::{AppError, ErrorKind};
use filevault_core::result::AppResult;
use filevault_core::traits::storage::{ByteStream, StorageProvider};

/// Keeps every object in a concurrent map.
///
/// Streamed writes are buffered and inserted in one step once the stream
/// has ended, so an aborted write never becomes visible.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorageProvider {
    objects: Arc<DashMap<String, Bytes>>,
}

impl MemoryStorageProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether no objects are stored.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn key(path: &str) -> String {
        path.trim_start_matches('/').to_string()
    }
}

#[async_trait]
impl StorageProvider for MemoryStorageProvider {
    fn provider_type(&self) -> &str {
        "memory"
    }

    fn is_durable(&self) -> bool {
        false
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn read(&self, path: &str) -> AppResult<ByteStream> {
        let data = self
            .objects
            .get(&Self::key(path))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::not_found(format!("Object not found: {path}")))?;
        Ok(Box::pin(futures::stream::once(async move { Ok(data) })))
    }

    async fn write_stream(&self, path: &str, mut stream: ByteStream) -> AppResult<u64> {
        let mut buffer = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                AppError::with_source(ErrorKind::StorageUnavailable, "Upload stream failed", e)
            })?;
            buffer.extend_from_slice(&chunk);
        }
        let total = buffer.len() as u64;
        self.objects.insert(Self::key(path), buffer.freeze());
        debug!(path, bytes = total, "Stored object in memory");
        Ok(total)
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        self.objects.remove(&Self::key(path));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn read_all(provider: &MemoryStorageProvider, path: &str) -> AppResult<Vec<u8>> {
        let mut stream = provider.read(path).await?;
        let mut out = Vec::new();
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk?);
        }
        Ok(out)
    }

    #[tokio::test]
    async fn test_stream_roundtrip() {
        let provider = MemoryStorageProvider::new();
        let stream: ByteStream = Box::pin(futures::stream::iter(vec![
            Ok(Bytes::from("hel")),
            Ok(Bytes::from("lo")),
        ]));
        let written = provider.write_stream("x/y", stream).await.unwrap();
        assert_eq!(written, 5);
        assert_eq!(read_all(&provider, "/x/y").await.unwrap(), b"hello");
        assert_eq!(provider.len(), 1);
        assert!(!provider.is_durable());
    }

    #[tokio::test]
    async fn test_aborted_stream_is_invisible() {
        let provider = MemoryStorageProvider::new();
        let stream: ByteStream = Box::pin(futures::stream::iter(vec![
            Ok(Bytes::from("partial")),
            Err(std::io::Error::other("boom")),
        ]));
        assert!(provider.write_stream("x/y", stream).await.is_err());
        let err = read_all(&provider, "x/y").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert!(provider.is_empty());
    }

    #[tokio::test]
    async fn test_missing_object() {
        let provider = MemoryStorageProvider::new();
        let err = read_all(&provider, "missing").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
