//! Shared helpers for the store integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use tempfile::TempDir;

use filevault_core::config::AppConfig;
use filevault_core::error::AppError;
use filevault_core::traits::storage::ByteStream;
use filevault_service::{FileQuery, FileStore, RequestContext, UploadRequest};
use filevault_storage::providers::MemoryStorageProvider;

/// A store plus whatever it needs to stay alive.
pub struct TestStore {
    /// The store under test.
    pub store: Arc<FileStore>,
    /// Configuration it was opened with.
    pub config: AppConfig,
    /// Backing provider, when the store runs in memory.
    pub memory: Option<Arc<MemoryStorageProvider>>,
    /// Data directory, when the store runs on disk.
    pub dir: Option<TempDir>,
}

impl TestStore {
    /// Store over the in-memory provider, without a catalog.
    pub async fn memory() -> Self {
        Self::memory_with(|_| {}).await
    }

    /// In-memory store with a tweaked configuration.
    pub async fn memory_with(tweak: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = AppConfig::default();
        config.storage.provider = "memory".to_string();
        config.store.persist_catalog = false;
        tweak(&mut config);

        let provider = Arc::new(MemoryStorageProvider::new());
        let store = FileStore::open_with_provider(&config, provider.clone())
            .await
            .expect("Failed to open memory store");
        Self {
            store: Arc::new(store),
            config,
            memory: Some(provider),
            dir: None,
        }
    }

    /// Store over the local provider in a fresh temp directory.
    pub async fn local() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut config = AppConfig::default();
        config.storage.provider = "local".to_string();
        config.storage.data_root = dir.path().to_string_lossy().into_owned();
        config.store.persist_catalog = true;

        let store = FileStore::open(&config)
            .await
            .expect("Failed to open local store");
        Self {
            store: Arc::new(store),
            config,
            memory: None,
            dir: Some(dir),
        }
    }

    /// Open a second store over the same configuration.
    pub async fn reopen(&self) -> Result<FileStore, AppError> {
        FileStore::open(&self.config).await
    }

    /// Number of blobs in the memory provider.
    pub fn blob_count(&self) -> usize {
        self.memory.as_ref().map(|m| m.len()).unwrap_or_default()
    }

    /// Upload text as `owner`, acting as `owner`.
    pub async fn upload(&self, owner: &str, project: &str, name: &str, content: &str) -> u32 {
        let request = UploadRequest::new(owner, project, name)
            .with_content_type("text/plain")
            .with_description(format!("{owner}'s file"));
        self.store
            .upload(&ctx(owner), &request, Bytes::from(content.to_string()))
            .await
            .expect("upload failed")
    }

    /// Download a version and return its bytes.
    pub async fn read(&self, store: &FileStore, acting: &str, query: &FileQuery) -> Vec<u8> {
        let download = store
            .download(&ctx(acting), query)
            .await
            .expect("download failed");
        collect(download.stream).await
    }
}

/// Request context for `identity`.
pub fn ctx(identity: &str) -> RequestContext {
    RequestContext::for_identity(identity).expect("valid identity")
}

/// Drain a byte stream.
pub async fn collect(mut stream: ByteStream) -> Vec<u8> {
    let mut out = Vec::new();
    while let Some(chunk) = stream.next().await {
        out.extend_from_slice(&chunk.expect("stream error"));
    }
    out
}
