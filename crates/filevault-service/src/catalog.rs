//! Persisted catalog: the ledger and metadata written as one JSON file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use filevault_core::error::{AppError, ErrorKind};
use filevault_core::result::AppResult;
use filevault_entity::{FileKey, FileVersion, VersionMetadata};

use crate::ledger::{Ledger, LineageState};
use crate::metadata::MetadataStore;

/// Catalog layout version written by this build.
pub const CATALOG_FORMAT: u32 = 1;

/// A version record and its metadata as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogVersion {
    /// Immutable version attributes.
    #[serde(flatten)]
    pub record: FileVersion,
    /// Mutable metadata at capture time.
    pub metadata: VersionMetadata,
}

/// One lineage in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogLineage {
    /// Lineage key.
    #[serde(flatten)]
    pub key: FileKey,
    /// Greatest version number ever assigned.
    pub high_water: u32,
    /// Live versions, ascending.
    #[serde(default)]
    pub versions: Vec<CatalogVersion>,
}

/// Full contents of a catalog file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    /// Layout version.
    pub format: u32,
    /// When the snapshot was taken.
    pub saved_at: DateTime<Utc>,
    /// Every lineage, retired ones included.
    pub lineages: Vec<CatalogLineage>,
}

impl CatalogSnapshot {
    /// Capture the current ledger and metadata.
    ///
    /// Metadata is read while each owner's partition is locked. A delete
    /// retires the ledger entry before it drops the metadata document, so
    /// every captured version carries its document; one without is skipped.
    pub async fn capture(ledger: &Ledger, metadata: &MetadataStore) -> Self {
        let lineages = ledger
            .export_with(|record| match metadata.get(&record.version_id) {
                Some(document) => Some(CatalogVersion {
                    record: record.clone(),
                    metadata: document,
                }),
                None => {
                    warn!(
                        version_id = %record.version_id,
                        "Skipping version without metadata in catalog"
                    );
                    None
                }
            })
            .await
            .into_iter()
            .map(|state| CatalogLineage {
                key: state.key,
                high_water: state.high_water,
                versions: state.versions,
            })
            .collect();

        Self {
            format: CATALOG_FORMAT,
            saved_at: Utc::now(),
            lineages,
        }
    }

    /// Rebuild a ledger and metadata store from this snapshot.
    pub fn restore(self) -> AppResult<(Ledger, MetadataStore)> {
        if self.format != CATALOG_FORMAT {
            return Err(AppError::new(
                ErrorKind::Serialization,
                format!("Unsupported catalog format {}", self.format),
            ));
        }

        let metadata = MetadataStore::new();
        let mut states = Vec::with_capacity(self.lineages.len());
        for lineage in self.lineages {
            let mut versions = Vec::with_capacity(lineage.versions.len());
            for version in lineage.versions {
                metadata.insert(version.record.version_id, version.metadata);
                versions.push(version.record);
            }
            states.push(LineageState {
                key: lineage.key,
                high_water: lineage.high_water,
                versions,
            });
        }

        let ledger = Ledger::import(states).map_err(|e| {
            AppError::new(
                ErrorKind::Serialization,
                format!("Catalog is inconsistent: {}", e.message),
            )
        })?;
        Ok((ledger, metadata))
    }

    /// Number of live versions in the snapshot.
    pub fn version_count(&self) -> usize {
        self.lineages.iter().map(|l| l.versions.len()).sum()
    }
}

/// Location of the catalog file.
#[derive(Debug, Clone)]
pub struct Catalog {
    path: PathBuf,
}

impl Catalog {
    /// Catalog stored at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The catalog file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the catalog, or `None` when no catalog has been written yet.
    pub async fn load(&self) -> AppResult<Option<CatalogSnapshot>> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::StorageUnavailable,
                    format!("Failed to read catalog: {}", self.path.display()),
                    e,
                ));
            }
        };

        let snapshot: CatalogSnapshot = serde_json::from_slice(&raw)?;
        debug!(
            path = %self.path.display(),
            lineages = snapshot.lineages.len(),
            "Loaded catalog"
        );
        Ok(Some(snapshot))
    }

    /// Write the catalog atomically: temp file, fsync, rename.
    pub async fn save(&self, snapshot: &CatalogSnapshot) -> AppResult<()> {
        let body = serde_json::to_vec_pretty(snapshot)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::StorageUnavailable,
                    format!("Failed to create catalog directory: {}", parent.display()),
                    e,
                )
            })?;
        }

        let temp = self.temp_path();
        if let Err(e) = write_synced(&temp, &body).await {
            discard_temp(&temp).await;
            return Err(AppError::with_source(
                ErrorKind::StorageUnavailable,
                format!("Failed to write catalog: {}", temp.display()),
                e,
            ));
        }

        if let Err(e) = fs::rename(&temp, &self.path).await {
            discard_temp(&temp).await;
            return Err(AppError::with_source(
                ErrorKind::StorageUnavailable,
                format!("Failed to publish catalog: {}", self.path.display()),
                e,
            ));
        }

        info!(
            path = %self.path.display(),
            lineages = snapshot.lineages.len(),
            versions = snapshot.version_count(),
            "Catalog saved"
        );
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "catalog.json".to_string());
        self.path
            .with_file_name(format!(".{name}.tmp.{}", Uuid::new_v4()))
    }
}

/// Remove a leftover temp file, logging rather than failing.
async fn discard_temp(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(
            path = %path.display(),
            error = %e,
            "Failed to remove catalog temp file"
        ),
    }
}

async fn write_synced(path: &Path, body: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(body).await?;
    file.sync_all().await
}
