//! Identity resolution: (owner, project, name, selector) to a version record.

use std::sync::Arc;

use filevault_core::result::AppResult;
use filevault_entity::{FileKey, FileVersion, VersionSelector};

use crate::ledger::Ledger;

/// Read-only view of the ledger that turns selectors into records.
///
/// Resolution has no side effects and is safe to run concurrently with
/// anything else.
#[derive(Debug, Clone)]
pub struct Resolver {
    ledger: Arc<Ledger>,
}

impl Resolver {
    /// Creates a resolver over `ledger`.
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self { ledger }
    }

    /// Resolve a key and selector.
    pub async fn resolve(&self, key: &FileKey, selector: VersionSelector) -> AppResult<FileVersion> {
        key.validate()?;
        self.ledger.resolve(key, selector).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use filevault_core::error::ErrorKind;
    use filevault_core::types::{BlobId, VersionId};

    use crate::ledger::NewVersion;

    #[tokio::test]
    async fn test_resolve_latest_missing_and_malformed() {
        let ledger = Arc::new(Ledger::new());
        let key = FileKey::new("user1", "project1", "testfile.txt");
        for _ in 0..2 {
            ledger
                .append(
                    &key,
                    NewVersion {
                        version_id: VersionId::new(),
                        blob_id: BlobId::new(),
                        content_type: "text/plain".to_string(),
                        size_bytes: 5,
                        checksum_sha256: String::new(),
                        created_by: "user1".to_string(),
                        created_at: Utc::now(),
                    },
                )
                .await
                .unwrap();
        }

        let resolver = Resolver::new(ledger);
        let latest = resolver
            .resolve(&key, VersionSelector::Latest)
            .await
            .unwrap();
        assert_eq!(latest.version, 2);

        let err = resolver
            .resolve(
                &FileKey::new("user1", "project1", "other.txt"),
                VersionSelector::Latest,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        let err = resolver
            .resolve(
                &FileKey::new("", "project1", "testfile.txt"),
                VersionSelector::Latest,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }
}
