//! Parameter sets callers send to the store.
//!
//! Field names follow the client wire format (`type`, `updatedMetadata`).

use serde::{Deserialize, Serialize};

use filevault_core::result::AppResult;
use filevault_entity::{FileKey, MetadataPatch, VersionSelector};

/// Default MIME type for uploads that name none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Parameters of an upload. The content travels separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    /// Logical file name, including extension.
    pub name: String,
    /// Owning tenant.
    pub owner: String,
    /// Namespace within the owner.
    pub project: String,
    /// MIME type; empty means [`DEFAULT_CONTENT_TYPE`].
    #[serde(rename = "type", default)]
    pub content_type: String,
    /// Description of this version.
    #[serde(default)]
    pub description: String,
}

impl UploadRequest {
    /// Creates an upload request with no type or description.
    pub fn new(
        owner: impl Into<String>,
        project: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            owner: owner.into(),
            project: project.into(),
            content_type: String::new(),
            description: String::new(),
        }
    }

    /// Set the MIME type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The target key.
    pub fn key(&self) -> FileKey {
        FileKey::new(&self.owner, &self.project, &self.name)
    }

    /// The MIME type to record.
    pub fn effective_content_type(&self) -> &str {
        let trimmed = self.content_type.trim();
        if trimmed.is_empty() {
            DEFAULT_CONTENT_TYPE
        } else {
            trimmed
        }
    }
}

/// Addresses one version: for info, download, and delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileQuery {
    /// Logical file name.
    pub name: String,
    /// Owning tenant.
    pub owner: String,
    /// Namespace within the owner.
    pub project: String,
    /// Version number, or `-1` for the latest.
    #[serde(default)]
    pub version: VersionSelector,
}

impl FileQuery {
    /// Query for the latest version of a key.
    pub fn latest(
        owner: impl Into<String>,
        project: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            owner: owner.into(),
            project: project.into(),
            version: VersionSelector::Latest,
        }
    }

    /// Select a specific version instead.
    pub fn at(mut self, version: VersionSelector) -> Self {
        self.version = version;
        self
    }

    /// The target key.
    pub fn key(&self) -> FileKey {
        FileKey::new(&self.owner, &self.project, &self.name)
    }
}

/// Patch one version's metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInfoRequest {
    /// Logical file name.
    pub name: String,
    /// Owning tenant.
    pub owner: String,
    /// Namespace within the owner.
    pub project: String,
    /// Version number, or `-1` for the latest.
    #[serde(default)]
    pub version: VersionSelector,
    /// JSON object text to merge into the metadata.
    pub updated_metadata: String,
}

impl UpdateInfoRequest {
    /// The target key.
    pub fn key(&self) -> FileKey {
        FileKey::new(&self.owner, &self.project, &self.name)
    }

    /// Parse `updated_metadata`.
    pub fn patch(&self) -> AppResult<MetadataPatch> {
        MetadataPatch::from_json_str(&self.updated_metadata)
    }
}

/// Patch every version an owner holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAllRequest {
    /// Owning tenant.
    pub owner: String,
    /// JSON object text to merge into every version's metadata.
    pub updated_metadata: String,
}

impl UpdateAllRequest {
    /// Parse `updated_metadata`.
    pub fn patch(&self) -> AppResult<MetadataPatch> {
        MetadataPatch::from_json_str(&self.updated_metadata)
    }
}
