//! Store operations subject to authorization.

use serde::{Deserialize, Serialize};

/// Every operation the store authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileAction {
    /// Create a new version.
    Upload,
    /// Read one version's attributes and metadata.
    GetInfo,
    /// Patch one version's metadata.
    UpdateInfo,
    /// Patch every version an owner holds.
    UpdateAllInfo,
    /// Stream one version's content.
    Download,
    /// Remove one version.
    Delete,
    /// Remove every lineage an owner holds.
    DeleteAll,
    /// List a lineage's versions.
    ListVersions,
    /// List an owner's lineages.
    ListFiles,
}

impl FileAction {
    /// Return the action as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upload => "file:upload",
            Self::GetInfo => "file:get_info",
            Self::UpdateInfo => "file:update_info",
            Self::UpdateAllInfo => "file:update_all_info",
            Self::Download => "file:download",
            Self::Delete => "file:delete",
            Self::DeleteAll => "file:delete_all",
            Self::ListVersions => "file:list_versions",
            Self::ListFiles => "file:list_files",
        }
    }
}

impl std::fmt::Display for FileAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
