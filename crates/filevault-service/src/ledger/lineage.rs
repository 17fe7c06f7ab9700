//! One file lineage: its live versions and its high-water mark.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use filevault_core::error::AppError;
use filevault_core::result::AppResult;
use filevault_core::types::{BlobId, VersionId};
use filevault_entity::{FileVersion, VersionSelector};

/// Everything about a version except its number, which the ledger assigns.
#[derive(Debug, Clone)]
pub struct NewVersion {
    /// Handle the metadata document was stored under.
    pub version_id: VersionId,
    /// Handle of the stored content.
    pub blob_id: BlobId,
    /// MIME type.
    pub content_type: String,
    /// Content size in bytes.
    pub size_bytes: u64,
    /// Hex-encoded SHA-256 of the content.
    pub checksum_sha256: String,
    /// Uploading identity.
    pub created_by: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl NewVersion {
    fn into_version(self, version: u32) -> FileVersion {
        FileVersion {
            version,
            version_id: self.version_id,
            blob_id: self.blob_id,
            content_type: self.content_type,
            size_bytes: self.size_bytes,
            checksum_sha256: self.checksum_sha256,
            created_by: self.created_by,
            created_at: self.created_at,
        }
    }
}

/// Live versions of one key, ordered by number.
///
/// `high_water` only ever grows. It survives deletion of every version, so
/// numbers are never handed out twice.
#[derive(Debug, Default)]
pub struct Lineage {
    versions: BTreeMap<u32, FileVersion>,
    high_water: u32,
}

impl Lineage {
    /// Rebuild a lineage from persisted state.
    pub(crate) fn restore(high_water: u32, versions: Vec<FileVersion>) -> AppResult<Self> {
        let mut map = BTreeMap::new();
        for record in versions {
            if record.version == 0 || record.version > high_water {
                return Err(AppError::internal(format!(
                    "version {} lies outside 1..={high_water}",
                    record.version
                )));
            }
            let number = record.version;
            if map.insert(number, record).is_some() {
                return Err(AppError::internal(format!("version {number} appears twice")));
            }
        }
        Ok(Self {
            versions: map,
            high_water,
        })
    }

    /// Greatest number ever assigned, 0 if none.
    pub fn high_water(&self) -> u32 {
        self.high_water
    }

    /// Whether no version is live.
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Number of live versions.
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Assign the next number to `draft` and record it.
    pub fn append(&mut self, draft: NewVersion) -> AppResult<FileVersion> {
        let number = self
            .high_water
            .checked_add(1)
            .ok_or_else(|| AppError::conflict("version numbers exhausted for this file"))?;
        let record = draft.into_version(number);
        self.high_water = number;
        self.versions.insert(number, record.clone());
        Ok(record)
    }

    /// The highest live version.
    pub fn latest(&self) -> Option<&FileVersion> {
        self.versions.values().next_back()
    }

    /// Look up a version by selector.
    pub fn resolve(&self, selector: VersionSelector) -> Option<&FileVersion> {
        match selector {
            VersionSelector::Latest => self.latest(),
            VersionSelector::Exact(number) => self.versions.get(&number),
        }
    }

    /// Remove one version.
    pub fn remove(&mut self, number: u32) -> Option<FileVersion> {
        self.versions.remove(&number)
    }

    /// Remove every version, keeping the high-water mark.
    pub fn drain(&mut self) -> Vec<FileVersion> {
        std::mem::take(&mut self.versions).into_values().collect()
    }

    /// Live versions in ascending order.
    pub fn versions(&self) -> impl Iterator<Item = &FileVersion> {
        self.versions.values()
    }
}
