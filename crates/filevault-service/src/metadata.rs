//! Per-version metadata documents.
//!
//! Documents are keyed by [`VersionId`] and kept apart from the blob store,
//! so rewriting metadata never touches content.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use filevault_core::error::{AppError, ErrorKind};
use filevault_core::result::AppResult;
use filevault_core::types::VersionId;
use filevault_entity::{FileKey, MetadataPatch, VersionMetadata};

use crate::ledger::LedgerEntry;

/// One (key, version) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRef {
    /// Lineage key.
    #[serde(flatten)]
    pub key: FileKey,
    /// Version number.
    pub version: u32,
}

/// A version a bulk update could not touch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkFailure {
    /// The version.
    #[serde(flatten)]
    pub target: VersionRef,
    /// Why it failed.
    pub kind: ErrorKind,
    /// Error message.
    pub message: String,
}

/// Outcome of applying one patch to many versions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUpdateReport {
    /// Versions the patch was applied to.
    pub updated: Vec<VersionRef>,
    /// Versions that could not be patched.
    pub failed: Vec<BulkFailure>,
}

impl BulkUpdateReport {
    /// Number of versions updated.
    pub fn updated_count(&self) -> usize {
        self.updated.len()
    }

    /// Whether every targeted version was updated.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Concurrent map of version metadata.
#[derive(Debug, Default)]
pub struct MetadataStore {
    documents: DashMap<VersionId, VersionMetadata>,
}

impl MetadataStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents held.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Fetch a copy of a version's metadata.
    pub fn get(&self, id: &VersionId) -> Option<VersionMetadata> {
        self.documents.get(id).map(|doc| doc.value().clone())
    }

    /// Store metadata for a new version.
    pub fn insert(&self, id: VersionId, metadata: VersionMetadata) {
        self.documents.insert(id, metadata);
    }

    /// Shallow-merge `patch` into one document and return the result.
    ///
    /// A missing document means the version was deleted after it was
    /// resolved, which is reported as [`ErrorKind::Conflict`].
    pub fn replace(
        &self,
        id: &VersionId,
        patch: &MetadataPatch,
        at: DateTime<Utc>,
    ) -> AppResult<VersionMetadata> {
        let mut doc = self
            .documents
            .get_mut(id)
            .ok_or_else(|| AppError::conflict("Version was deleted before the update applied"))?;
        doc.apply(patch, at);
        Ok(doc.value().clone())
    }

    /// Apply `patch` to every version in `snapshot`, historical ones included.
    pub fn replace_all(
        &self,
        snapshot: &[LedgerEntry],
        patch: &MetadataPatch,
        at: DateTime<Utc>,
    ) -> BulkUpdateReport {
        let mut report = BulkUpdateReport::default();
        for entry in snapshot {
            let target = VersionRef {
                key: entry.key.clone(),
                version: entry.version.version,
            };
            match self.replace(&entry.version.version_id, patch, at) {
                Ok(_) => report.updated.push(target),
                Err(err) => report.failed.push(BulkFailure {
                    target,
                    kind: err.kind,
                    message: err.message,
                }),
            }
        }
        report
    }

    /// Drop a version's metadata.
    pub fn remove(&self, id: &VersionId) -> Option<VersionMetadata> {
        self.documents.remove(id).map(|(_, doc)| doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filevault_core::types::BlobId;
    use filevault_entity::FileVersion;
    use serde_json::json;

    fn entry(name: &str, version: u32) -> LedgerEntry {
        LedgerEntry {
            key: FileKey::new("user1", "project1", name),
            version: FileVersion {
                version,
                version_id: VersionId::new(),
                blob_id: BlobId::new(),
                content_type: "text/plain".to_string(),
                size_bytes: 0,
                checksum_sha256: String::new(),
                created_by: "user1".to_string(),
                created_at: Utc::now(),
            },
        }
    }

    #[test]
    fn test_replace_merges() {
        let store = MetadataStore::new();
        let id = VersionId::new();
        store.insert(id, VersionMetadata::new("desc"));

        let patch = MetadataPatch::from_value(json!({"k": "v"})).unwrap();
        let updated = store.replace(&id, &patch, Utc::now()).unwrap();
        assert_eq!(updated.document.get("k"), Some(&json!("v")));
        assert_eq!(store.get(&id).unwrap(), updated);
    }

    #[test]
    fn test_replace_missing_is_conflict() {
        let store = MetadataStore::new();
        let err = store
            .replace(&VersionId::new(), &MetadataPatch::default(), Utc::now())
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[test]
    fn test_replace_all_reports_deleted_versions() {
        let store = MetadataStore::new();
        let snapshot = vec![entry("a", 1), entry("a", 2), entry("b", 1)];
        for e in &snapshot {
            store.insert(e.version.version_id, VersionMetadata::new(""));
        }
        store.remove(&snapshot[1].version.version_id);

        let patch = MetadataPatch::from_value(json!({"bulk": true})).unwrap();
        let report = store.replace_all(&snapshot, &patch, Utc::now());

        assert_eq!(report.updated_count(), 2);
        assert!(!report.is_complete());
        assert_eq!(report.failed[0].target.version, 2);
        assert_eq!(report.failed[0].kind, ErrorKind::Conflict);
        for e in [&snapshot[0], &snapshot[2]] {
            let doc = store.get(&e.version.version_id).unwrap();
            assert_eq!(doc.document.get("bulk"), Some(&json!(true)));
        }
    }
}
