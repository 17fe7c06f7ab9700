//! The version ledger.
//!
//! Maps every (owner, project, name) key to its [`Lineage`] and hands out
//! version numbers. The ledger is partitioned by owner: callers working on
//! different owners never contend on a shared lock.

mod lineage;
mod partition;

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use filevault_core::error::AppError;
use filevault_core::result::AppResult;
use filevault_entity::{FileKey, FileSummary, FileVersion, LineagePath, VersionSelector};

pub use self::lineage::{Lineage, NewVersion};
use self::partition::OwnerPartition;

/// A version record together with the key it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Lineage key.
    pub key: FileKey,
    /// Version record.
    pub version: FileVersion,
}

/// What a cascading delete took out of the ledger.
#[derive(Debug, Clone, Default)]
pub struct RemovedFiles {
    /// Number of lineages that had at least one live version.
    pub lineages: usize,
    /// Every removed version.
    pub entries: Vec<LedgerEntry>,
}

/// Persistable state of one lineage, including retired ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageState<V = FileVersion> {
    /// Lineage key.
    #[serde(flatten)]
    pub key: FileKey,
    /// Greatest version number ever assigned.
    pub high_water: u32,
    /// Live versions, ascending.
    pub versions: Vec<V>,
}

/// Owner-partitioned index of lineages.
#[derive(Debug, Default)]
pub struct Ledger {
    partitions: DashMap<String, Arc<OwnerPartition>>,
}

fn no_such_file(key: &FileKey) -> AppError {
    AppError::not_found(format!("File not found: {key}"))
}

fn no_such_version(key: &FileKey, selector: VersionSelector) -> AppError {
    AppError::not_found(format!("Version {selector} of {key} not found"))
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    fn partition(&self, owner: &str) -> Option<Arc<OwnerPartition>> {
        self.partitions.get(owner).map(|p| Arc::clone(p.value()))
    }

    fn partition_or_create(&self, owner: &str) -> Arc<OwnerPartition> {
        Arc::clone(self.partitions.entry(owner.to_string()).or_default().value())
    }

    /// Run `f` against one lineage under its lock.
    ///
    /// A lineage with no live versions is reported as missing.
    async fn with_lineage<T>(
        &self,
        key: &FileKey,
        f: impl FnOnce(&mut Lineage) -> AppResult<T>,
    ) -> AppResult<T> {
        let partition = self.partition(&key.owner).ok_or_else(|| no_such_file(key))?;
        let lineages = partition.lineages.read().await;
        let lineage = lineages.get(&key.path()).ok_or_else(|| no_such_file(key))?;
        let mut lineage = lineage.lock().await;
        if lineage.is_empty() {
            return Err(no_such_file(key));
        }
        f(&mut *lineage)
    }

    /// Record a new version under `key`, creating the lineage if needed.
    pub async fn append(&self, key: &FileKey, draft: NewVersion) -> AppResult<FileVersion> {
        let partition = self.partition_or_create(&key.owner);
        let path = key.path();

        {
            let lineages = partition.lineages.read().await;
            if let Some(lineage) = lineages.get(&path) {
                return lineage.lock().await.append(draft);
            }
        }

        let mut lineages = partition.lineages.write().await;
        let lineage = lineages.entry(path).or_default();
        let mut lineage = lineage.lock().await;
        lineage.append(draft)
    }

    /// Resolve a selector to a version record.
    pub async fn resolve(&self, key: &FileKey, selector: VersionSelector) -> AppResult<FileVersion> {
        self.with_resolved(key, selector, |version| Ok(version.clone()))
            .await
    }

    /// Resolve a selector and run `f` while the lineage is still locked.
    ///
    /// No delete of the same lineage can interleave with `f`.
    pub async fn with_resolved<T>(
        &self,
        key: &FileKey,
        selector: VersionSelector,
        f: impl FnOnce(&FileVersion) -> AppResult<T>,
    ) -> AppResult<T> {
        self.with_lineage(key, |lineage| {
            let version = lineage
                .resolve(selector)
                .ok_or_else(|| no_such_version(key, selector))?;
            f(version)
        })
        .await
    }

    /// Live versions of a lineage, ascending.
    pub async fn list(&self, key: &FileKey) -> AppResult<Vec<FileVersion>> {
        self.with_lineage(key, |lineage| Ok(lineage.versions().cloned().collect()))
            .await
    }

    /// Remove one version by number.
    pub async fn remove(&self, key: &FileKey, version: u32) -> AppResult<FileVersion> {
        self.remove_selected(key, VersionSelector::Exact(version))
            .await
    }

    /// Resolve and remove in one step.
    ///
    /// Removing the last live version retires the lineage; its high-water
    /// mark is kept.
    pub async fn remove_selected(
        &self,
        key: &FileKey,
        selector: VersionSelector,
    ) -> AppResult<FileVersion> {
        self.with_lineage(key, |lineage| {
            let number = lineage
                .resolve(selector)
                .map(|v| v.version)
                .ok_or_else(|| no_such_version(key, selector))?;
            lineage
                .remove(number)
                .ok_or_else(|| no_such_version(key, selector))
        })
        .await
    }

    /// Remove every live version of every lineage `owner` has.
    ///
    /// Holds the owner's write lock throughout, so a concurrent append to
    /// the same owner lands entirely before or entirely after.
    pub async fn remove_all(&self, owner: &str) -> RemovedFiles {
        let mut removed = RemovedFiles::default();
        let Some(partition) = self.partition(owner) else {
            return removed;
        };

        let lineages = partition.lineages.write().await;
        for (path, lineage) in lineages.iter() {
            let drained = lineage.lock().await.drain();
            if drained.is_empty() {
                continue;
            }
            removed.lineages += 1;
            let key = FileKey::from_path(owner, path);
            removed
                .entries
                .extend(drained.into_iter().map(|version| LedgerEntry {
                    key: key.clone(),
                    version,
                }));
        }
        removed
    }

    /// Every live version `owner` has, taken at a single instant.
    pub async fn snapshot(&self, owner: &str) -> Vec<LedgerEntry> {
        let Some(partition) = self.partition(owner) else {
            return Vec::new();
        };

        let lineages = partition.lineages.write().await;
        let mut entries = Vec::new();
        for (path, lineage) in lineages.iter() {
            let lineage = lineage.lock().await;
            let key = FileKey::from_path(owner, path);
            entries.extend(lineage.versions().map(|version| LedgerEntry {
                key: key.clone(),
                version: version.clone(),
            }));
        }
        entries.sort_by(|a, b| {
            (&a.key, a.version.version).cmp(&(&b.key, b.version.version))
        });
        entries
    }

    /// One summary per live lineage of `owner`, sorted by project then name.
    pub async fn summaries(&self, owner: &str) -> Vec<FileSummary> {
        let Some(partition) = self.partition(owner) else {
            return Vec::new();
        };

        let lineages = partition.lineages.read().await;
        let mut summaries = Vec::new();
        for (path, lineage) in lineages.iter() {
            let lineage = lineage.lock().await;
            if let Some(latest) = lineage.latest() {
                summaries.push(FileSummary {
                    project: path.project.clone(),
                    name: path.name.clone(),
                    latest_version: latest.version,
                    version_count: lineage.len(),
                    latest_created_at: latest.created_at,
                });
            }
        }
        summaries.sort_by(|a, b| (&a.project, &a.name).cmp(&(&b.project, &b.name)));
        summaries
    }

    /// Owners that have ever had a lineage, sorted.
    pub fn owners(&self) -> Vec<String> {
        let mut owners: Vec<String> = self.partitions.iter().map(|p| p.key().clone()).collect();
        owners.sort();
        owners
    }

    /// Persistable state of every lineage, retired ones included, with each
    /// live version mapped through `f`.
    ///
    /// `f` runs while the owner's partition is write-locked, so no version
    /// can be appended or removed between the ledger read and `f`. Versions
    /// for which `f` returns `None` are left out.
    pub async fn export_with<V>(
        &self,
        mut f: impl FnMut(&FileVersion) -> Option<V>,
    ) -> Vec<LineageState<V>> {
        let mut states = Vec::new();
        for owner in self.owners() {
            let Some(partition) = self.partition(&owner) else {
                continue;
            };
            let lineages = partition.lineages.write().await;
            for (path, lineage) in lineages.iter() {
                let lineage = lineage.lock().await;
                states.push(LineageState {
                    key: FileKey::from_path(&owner, path),
                    high_water: lineage.high_water(),
                    versions: lineage.versions().filter_map(&mut f).collect(),
                });
            }
        }
        states.sort_by(|a, b| a.key.cmp(&b.key));
        states
    }

    /// Rebuild a ledger from exported state.
    pub fn import(states: Vec<LineageState>) -> AppResult<Self> {
        let mut owners: HashMap<String, HashMap<LineagePath, Lineage>> = HashMap::new();
        for state in states {
            state.key.validate()?;
            let lineage = Lineage::restore(state.high_water, state.versions)
                .map_err(|e| AppError::internal(format!("lineage {}: {}", state.key, e.message)))?;
            let lineages = owners.entry(state.key.owner.clone()).or_default();
            if lineages.insert(state.key.path(), lineage).is_some() {
                return Err(AppError::internal(format!(
                    "lineage {} appears twice",
                    state.key
                )));
            }
        }

        let partitions = owners
            .into_iter()
            .map(|(owner, lineages)| (owner, Arc::new(OwnerPartition::from_lineages(lineages))))
            .collect();
        Ok(Self { partitions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use filevault_core::error::ErrorKind;
    use filevault_core::types::{BlobId, VersionId};

    fn draft() -> NewVersion {
        NewVersion {
            version_id: VersionId::new(),
            blob_id: BlobId::new(),
            content_type: "text/plain".to_string(),
            size_bytes: 1,
            checksum_sha256: String::new(),
            created_by: "user1".to_string(),
            created_at: Utc::now(),
        }
    }

    fn key(name: &str) -> FileKey {
        FileKey::new("user1", "project1", name)
    }

    #[tokio::test]
    async fn test_append_resolve_latest() {
        let ledger = Ledger::new();
        assert_eq!(ledger.append(&key("a"), draft()).await.unwrap().version, 1);
        assert_eq!(ledger.append(&key("a"), draft()).await.unwrap().version, 2);
        assert_eq!(ledger.append(&key("b"), draft()).await.unwrap().version, 1);

        let latest = ledger.resolve(&key("a"), VersionSelector::Latest).await.unwrap();
        assert_eq!(latest.version, 2);

        let err = ledger
            .resolve(&key("a"), VersionSelector::Exact(9))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_removing_last_version_retires_lineage() {
        let ledger = Ledger::new();
        ledger.append(&key("a"), draft()).await.unwrap();
        ledger.remove(&key("a"), 1).await.unwrap();

        let err = ledger.resolve(&key("a"), VersionSelector::Latest).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert!(ledger.list(&key("a")).await.is_err());
        assert!(ledger.summaries("user1").await.is_empty());

        // The number is not handed out again.
        assert_eq!(ledger.append(&key("a"), draft()).await.unwrap().version, 2);
    }

    #[tokio::test]
    async fn test_remove_selected_latest() {
        let ledger = Ledger::new();
        for _ in 0..3 {
            ledger.append(&key("a"), draft()).await.unwrap();
        }
        let removed = ledger
            .remove_selected(&key("a"), VersionSelector::Latest)
            .await
            .unwrap();
        assert_eq!(removed.version, 3);
        let versions: Vec<u32> = ledger
            .list(&key("a"))
            .await
            .unwrap()
            .iter()
            .map(|v| v.version)
            .collect();
        assert_eq!(versions, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_remove_all_is_owner_scoped() {
        let ledger = Ledger::new();
        ledger.append(&key("a"), draft()).await.unwrap();
        ledger.append(&key("a"), draft()).await.unwrap();
        ledger.append(&key("b"), draft()).await.unwrap();
        let other = FileKey::new("user2", "project1", "a");
        ledger.append(&other, draft()).await.unwrap();

        let removed = ledger.remove_all("user1").await;
        assert_eq!(removed.lineages, 2);
        assert_eq!(removed.entries.len(), 3);
        assert!(ledger.snapshot("user1").await.is_empty());
        assert!(ledger.resolve(&other, VersionSelector::Latest).await.is_ok());

        assert_eq!(ledger.remove_all("user1").await.lineages, 0);
        assert_eq!(ledger.remove_all("nobody").await.lineages, 0);
        assert_eq!(ledger.append(&key("a"), draft()).await.unwrap().version, 3);
    }

    #[tokio::test]
    async fn test_concurrent_appends_get_distinct_numbers() {
        let ledger = Arc::new(Ledger::new());
        let mut handles = Vec::new();
        for _ in 0..64 {
            let ledger = Arc::clone(&ledger);
            handles.push(tokio::spawn(async move {
                ledger.append(&key("hot"), draft()).await.unwrap().version
            }));
        }
        let mut numbers = Vec::new();
        for handle in handles {
            numbers.push(handle.await.unwrap());
        }
        numbers.sort();
        assert_eq!(numbers, (1..=64).collect::<Vec<u32>>());
    }

    #[tokio::test]
    async fn test_export_import_keeps_high_water() {
        let ledger = Ledger::new();
        ledger.append(&key("a"), draft()).await.unwrap();
        ledger.append(&key("a"), draft()).await.unwrap();
        ledger.remove(&key("a"), 2).await.unwrap();
        ledger.append(&key("gone"), draft()).await.unwrap();
        ledger.remove(&key("gone"), 1).await.unwrap();

        let states = ledger.export_with(|version| Some(version.clone())).await;
        assert_eq!(states.len(), 2);

        let restored = Ledger::import(states).unwrap();
        assert_eq!(restored.list(&key("a")).await.unwrap().len(), 1);
        assert_eq!(restored.append(&key("a"), draft()).await.unwrap().version, 3);
        assert_eq!(restored.append(&key("gone"), draft()).await.unwrap().version, 2);
    }

    #[test]
    fn test_import_rejects_duplicate_lineage() {
        let state = LineageState {
            key: key("a"),
            high_water: 0,
            versions: Vec::new(),
        };
        assert!(Ledger::import(vec![state.clone(), state]).is_err());
    }
}
