//! Read models returned by the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::key::FileKey;
use super::metadata::{MetadataDocument, VersionMetadata};
use super::version::FileVersion;

/// Everything about one version except its content bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Owning tenant.
    pub owner: String,
    /// Namespace within the owner.
    pub project: String,
    /// Logical file name.
    pub name: String,
    /// Version number.
    pub version: u32,
    /// MIME type supplied at upload.
    pub content_type: String,
    /// Current description.
    pub description: String,
    /// Current metadata document.
    pub metadata: MetadataDocument,
    /// Content size in bytes.
    pub size_bytes: u64,
    /// Hex-encoded SHA-256 of the content.
    pub checksum_sha256: String,
    /// Identity that uploaded the version.
    pub created_by: String,
    /// When the version was created.
    pub created_at: DateTime<Utc>,
    /// When its metadata last changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl FileInfo {
    /// Combine a version record with its metadata.
    pub fn from_parts(key: &FileKey, version: &FileVersion, metadata: VersionMetadata) -> Self {
        Self {
            owner: key.owner.clone(),
            project: key.project.clone(),
            name: key.name.clone(),
            version: version.version,
            content_type: version.content_type.clone(),
            description: metadata.description,
            metadata: metadata.document,
            size_bytes: version.size_bytes,
            checksum_sha256: version.checksum_sha256.clone(),
            created_by: version.created_by.clone(),
            created_at: version.created_at,
            updated_at: metadata.updated_at,
        }
    }
}

/// One live lineage in an owner's listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    /// Namespace within the owner.
    pub project: String,
    /// Logical file name.
    pub name: String,
    /// Highest version present.
    pub latest_version: u32,
    /// Number of versions present.
    pub version_count: usize,
    /// Creation time of the latest version.
    pub latest_created_at: DateTime<Utc>,
}
