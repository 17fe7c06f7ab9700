//! File version entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use filevault_core::types::{BlobId, VersionId};

/// One immutable version in a lineage.
///
/// Everything here is fixed at upload. The mutable part of a version
/// (description and metadata document) lives in the metadata store under
/// `version_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileVersion {
    /// Sequential version number, starting at 1.
    pub version: u32,
    /// Handle of this version's metadata document.
    pub version_id: VersionId,
    /// Handle of this version's content in the blob store.
    pub blob_id: BlobId,
    /// MIME type supplied at upload.
    pub content_type: String,
    /// Content size in bytes.
    pub size_bytes: u64,
    /// Hex-encoded SHA-256 of the content.
    pub checksum_sha256: String,
    /// Identity that uploaded this version.
    pub created_by: String,
    /// When this version was created.
    pub created_at: DateTime<Utc>,
}
