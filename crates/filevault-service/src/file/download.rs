//! Download: resolve under the lineage lock, then stream lock-free.

use std::fmt;

use tracing::info;

use filevault_auth::FileAction;
use filevault_core::error::{AppError, ErrorKind};
use filevault_core::result::AppResult;
use filevault_core::traits::storage::ByteStream;
use filevault_entity::FileKey;

use crate::context::RequestContext;
use crate::file::request::FileQuery;
use crate::store::FileStore;

/// Content of one version plus what a caller needs to serve it.
pub struct DownloadResult {
    /// Lineage key.
    pub key: FileKey,
    /// Resolved version number.
    pub version: u32,
    /// MIME type recorded at upload.
    pub content_type: String,
    /// Content size in bytes.
    pub size_bytes: u64,
    /// Hex-encoded SHA-256 of the content.
    pub checksum_sha256: String,
    /// The content.
    pub stream: ByteStream,
}

impl fmt::Debug for DownloadResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadResult")
            .field("key", &self.key)
            .field("version", &self.version)
            .field("content_type", &self.content_type)
            .field("size_bytes", &self.size_bytes)
            .finish_non_exhaustive()
    }
}

impl FileStore {
    /// Open the content of one version.
    pub async fn download(
        &self,
        ctx: &RequestContext,
        query: &FileQuery,
    ) -> AppResult<DownloadResult> {
        let key = query.key();
        self.authorize(ctx, &key.owner, FileAction::Download)?;

        let record = self.resolver.resolve(&key, query.version).await?;

        let stream = self.blobs.open(&record.blob_id).await.map_err(|e| {
            if e.is(ErrorKind::NotFound) {
                // Deleted between resolution and open.
                AppError::not_found(format!("Version {} of {key} not found", record.version))
            } else {
                e
            }
        })?;

        info!(
            identity = ctx.identity(),
            owner = %key.owner,
            project = %key.project,
            name = %key.name,
            version = record.version,
            request_id = %ctx.request_id,
            "File version downloaded"
        );

        Ok(DownloadResult {
            key,
            version: record.version,
            content_type: record.content_type,
            size_bytes: record.size_bytes,
            checksum_sha256: record.checksum_sha256,
            stream,
        })
    }
}
