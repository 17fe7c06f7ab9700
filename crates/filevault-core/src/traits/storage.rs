//! Storage provider trait for pluggable blob backends.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;

/// A byte stream type used for reading and writing object contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Trait for blob storage backends.
///
/// Implementations live in `filevault-storage` (local filesystem and
/// in-memory). Writes are all-or-nothing: a write that fails or is
/// cancelled part-way must leave no object at `path`.
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "memory").
    fn provider_type(&self) -> &str;

    /// Whether stored objects outlive the process.
    fn is_durable(&self) -> bool {
        true
    }

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Read an object and return its byte stream.
    async fn read(&self, path: &str) -> AppResult<ByteStream>;

    /// Write a byte stream to an object at the given path, returning the
    /// number of bytes written.
    async fn write_stream(&self, path: &str, stream: ByteStream) -> AppResult<u64>;

    /// Delete the object at the given path. Deleting a missing object is not an error.
    async fn delete(&self, path: &str) -> AppResult<()>;
}
