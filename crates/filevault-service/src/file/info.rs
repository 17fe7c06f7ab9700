//! Metadata reads, patches, and listings.

use chrono::Utc;
use tracing::{info, warn};

use filevault_auth::FileAction;
use filevault_core::error::AppError;
use filevault_core::result::AppResult;
use filevault_entity::{FileInfo, FileKey, FileSummary, MetadataPatch, VersionSelector};

use crate::context::RequestContext;
use crate::file::request::{FileQuery, UpdateAllRequest, UpdateInfoRequest};
use crate::metadata::BulkUpdateReport;
use crate::store::FileStore;

impl FileStore {
    /// Attributes and metadata of one version, without content.
    pub async fn get_info(&self, ctx: &RequestContext, query: &FileQuery) -> AppResult<FileInfo> {
        let key = query.key();
        self.authorize(ctx, &key.owner, FileAction::GetInfo)?;
        key.validate()?;

        self.ledger
            .with_resolved(&key, query.version, |record| {
                let metadata = self.metadata.get(&record.version_id).ok_or_else(|| {
                    AppError::internal(format!("Metadata missing for {key} v{}", record.version))
                })?;
                Ok(FileInfo::from_parts(&key, record, metadata))
            })
            .await
    }

    /// Merge a patch into one version's metadata.
    pub async fn update_info(
        &self,
        ctx: &RequestContext,
        request: &UpdateInfoRequest,
    ) -> AppResult<FileInfo> {
        let key = request.key();
        self.authorize(ctx, &key.owner, FileAction::UpdateInfo)?;
        let patch = request.patch()?;

        self.patch_version(ctx, &key, request.version, &patch).await
    }

    /// Merge an already parsed patch into the selected version.
    pub async fn apply_patch(
        &self,
        ctx: &RequestContext,
        key: &FileKey,
        selector: VersionSelector,
        patch: &MetadataPatch,
    ) -> AppResult<FileInfo> {
        self.authorize(ctx, &key.owner, FileAction::UpdateInfo)?;
        self.patch_version(ctx, key, selector, patch).await
    }

    /// Holds the lineage lock while patching, so no delete can interleave.
    /// Callers have already authorized.
    async fn patch_version(
        &self,
        ctx: &RequestContext,
        key: &FileKey,
        selector: VersionSelector,
        patch: &MetadataPatch,
    ) -> AppResult<FileInfo> {
        key.validate()?;
        let now = Utc::now();

        let info = self
            .ledger
            .with_resolved(key, selector, |record| {
                let metadata = self.metadata.replace(&record.version_id, patch, now)?;
                Ok(FileInfo::from_parts(key, record, metadata))
            })
            .await?;

        info!(
            identity = ctx.identity(),
            owner = %key.owner,
            project = %key.project,
            name = %key.name,
            version = info.version,
            request_id = %ctx.request_id,
            "File metadata updated"
        );
        Ok(info)
    }

    /// Merge a patch into every version `request.owner` holds.
    ///
    /// Returns the number of versions updated.
    pub async fn update_all_owner_info(
        &self,
        ctx: &RequestContext,
        request: &UpdateAllRequest,
    ) -> AppResult<usize> {
        let patch = request.patch()?;
        let report = self
            .update_all_owner_info_report(ctx, &request.owner, &patch)
            .await?;
        Ok(report.updated_count())
    }

    /// Like [`update_all_owner_info`](Self::update_all_owner_info), returning
    /// which versions were and were not updated.
    ///
    /// Works over a snapshot taken on entry; versions uploaded afterwards
    /// are not touched.
    pub async fn update_all_owner_info_report(
        &self,
        ctx: &RequestContext,
        owner: &str,
        patch: &MetadataPatch,
    ) -> AppResult<BulkUpdateReport> {
        self.authorize(ctx, owner, FileAction::UpdateAllInfo)?;

        let snapshot = self.ledger.snapshot(owner).await;
        let report = self.metadata.replace_all(&snapshot, patch, Utc::now());

        if !report.is_complete() {
            warn!(
                owner,
                failed = report.failed.len(),
                request_id = %ctx.request_id,
                "Some versions were deleted during bulk metadata update"
            );
        }
        info!(
            identity = ctx.identity(),
            owner,
            updated = report.updated_count(),
            request_id = %ctx.request_id,
            "Owner metadata updated"
        );
        Ok(report)
    }

    /// Every live version of one lineage, oldest first.
    pub async fn list_versions(
        &self,
        ctx: &RequestContext,
        key: &FileKey,
    ) -> AppResult<Vec<FileInfo>> {
        self.authorize(ctx, &key.owner, FileAction::ListVersions)?;
        key.validate()?;

        let records = self.ledger.list(key).await?;
        Ok(records
            .iter()
            .filter_map(|record| {
                // Skip versions deleted after the listing was taken.
                self.metadata
                    .get(&record.version_id)
                    .map(|metadata| FileInfo::from_parts(key, record, metadata))
            })
            .collect())
    }

    /// One summary per live lineage of `owner`.
    pub async fn list_owner_files(
        &self,
        ctx: &RequestContext,
        owner: &str,
    ) -> AppResult<Vec<FileSummary>> {
        self.authorize(ctx, owner, FileAction::ListFiles)?;
        Ok(self.ledger.summaries(owner).await)
    }
}
