//! Targeted and cascading deletes.

use tracing::{info, warn};

use filevault_auth::FileAction;
use filevault_core::result::AppResult;
use filevault_core::types::BlobId;

use crate::context::RequestContext;
use crate::file::request::FileQuery;
use crate::store::FileStore;

impl FileStore {
    /// Delete one version and return its number.
    ///
    /// Deleting the only version destroys the lineage.
    pub async fn delete(&self, ctx: &RequestContext, query: &FileQuery) -> AppResult<u32> {
        let key = query.key();
        self.authorize(ctx, &key.owner, FileAction::Delete)?;
        key.validate()?;

        let removed = self.ledger.remove_selected(&key, query.version).await?;
        self.metadata.remove(&removed.version_id);
        self.discard_blob(&removed.blob_id).await;

        info!(
            identity = ctx.identity(),
            owner = %key.owner,
            project = %key.project,
            name = %key.name,
            version = removed.version,
            request_id = %ctx.request_id,
            "File version deleted"
        );
        Ok(removed.version)
    }

    /// Delete every lineage `owner` has and return how many there were.
    pub async fn delete_all_owner_files(
        &self,
        ctx: &RequestContext,
        owner: &str,
    ) -> AppResult<usize> {
        self.authorize(ctx, owner, FileAction::DeleteAll)?;

        let removed = self.ledger.remove_all(owner).await;
        for entry in &removed.entries {
            self.metadata.remove(&entry.version.version_id);
            self.discard_blob(&entry.version.blob_id).await;
        }

        info!(
            identity = ctx.identity(),
            owner,
            lineages = removed.lineages,
            versions = removed.entries.len(),
            request_id = %ctx.request_id,
            "Owner files deleted"
        );
        Ok(removed.lineages)
    }

    /// The version is already gone from the ledger, so a failed blob
    /// delete only leaves an unreachable orphan.
    async fn discard_blob(&self, blob_id: &BlobId) {
        if let Err(e) = self.blobs.delete(blob_id).await {
            warn!(%blob_id, error = %e, "Failed to delete blob of removed version");
        }
    }
}
