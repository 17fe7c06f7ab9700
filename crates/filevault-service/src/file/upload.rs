//! Upload: every call creates a new version.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tracing::{info, warn};

use filevault_auth::FileAction;
use filevault_core::result::AppResult;
use filevault_core::traits::storage::ByteStream;
use filevault_core::types::{BlobId, VersionId};
use filevault_entity::VersionMetadata;
use filevault_storage::BlobStore;

use crate::context::RequestContext;
use crate::file::request::UploadRequest;
use crate::ledger::NewVersion;
use crate::metadata::MetadataStore;
use crate::store::FileStore;

/// Blob and metadata written for a version the ledger has not recorded yet.
///
/// Dropping it uncommitted (on error or cancellation) removes both.
struct PendingVersion {
    metadata: Arc<MetadataStore>,
    blobs: BlobStore,
    version_id: VersionId,
    blob_id: BlobId,
    armed: bool,
}

impl PendingVersion {
    fn commit(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingVersion {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.metadata.remove(&self.version_id);

        let blob_id = self.blob_id;
        let blobs = self.blobs.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = blobs.delete(&blob_id).await {
                        warn!(%blob_id, error = %e, "Failed to remove orphaned blob");
                    }
                });
            }
            Err(_) => warn!(%blob_id, "No runtime to remove orphaned blob"),
        }
    }
}

impl FileStore {
    /// Store `content` as the next version of the request's key.
    ///
    /// Returns the assigned version number.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        request: &UploadRequest,
        content: Bytes,
    ) -> AppResult<u32> {
        let stream: ByteStream = Box::pin(futures::stream::once(async move { Ok(content) }));
        self.upload_stream(ctx, request, stream).await
    }

    /// Like [`upload`](Self::upload), streaming the content.
    ///
    /// The new version becomes resolvable only once the whole stream has
    /// been stored. A failed or abandoned stream leaves the lineage as it was.
    pub async fn upload_stream(
        &self,
        ctx: &RequestContext,
        request: &UploadRequest,
        content: ByteStream,
    ) -> AppResult<u32> {
        let key = request.key();
        self.authorize(ctx, &key.owner, FileAction::Upload)?;
        key.validate()?;

        let receipt = self.blobs.put_stream(content).await?;

        let version_id = VersionId::new();
        self.metadata
            .insert(version_id, VersionMetadata::new(&request.description));
        let pending = PendingVersion {
            metadata: Arc::clone(&self.metadata),
            blobs: self.blobs.clone(),
            version_id,
            blob_id: receipt.blob_id,
            armed: true,
        };

        let record = self
            .ledger
            .append(
                &key,
                NewVersion {
                    version_id,
                    blob_id: receipt.blob_id,
                    content_type: request.effective_content_type().to_string(),
                    size_bytes: receipt.size_bytes,
                    checksum_sha256: receipt.checksum_sha256,
                    created_by: ctx.identity().to_string(),
                    created_at: Utc::now(),
                },
            )
            .await?;
        pending.commit();

        info!(
            identity = ctx.identity(),
            owner = %key.owner,
            project = %key.project,
            name = %key.name,
            version = record.version,
            size = record.size_bytes,
            request_id = %ctx.request_id,
            "File version uploaded"
        );
        Ok(record.version)
    }
}
