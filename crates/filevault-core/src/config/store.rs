//! Ledger, catalog, and access policy configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Settings for the versioned file store itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Catalog snapshot path. Defaults to `<data_root>/catalog.json`.
    #[serde(default)]
    pub catalog_file: Option<String>,
    /// Whether mutating CLI commands write the catalog back after running.
    #[serde(default = "default_true")]
    pub persist_catalog: bool,
    /// Report cross-owner access as `NotFound` instead of `Denied`.
    #[serde(default)]
    pub conceal_denials: bool,
}

impl StoreConfig {
    /// Resolve the catalog path against the storage data root.
    pub fn catalog_path(&self, data_root: &str) -> PathBuf {
        match &self.catalog_file {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(data_root).join("catalog.json"),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            catalog_file: None,
            persist_catalog: true,
            conceal_denials: false,
        }
    }
}

fn default_true() -> bool {
    true
}
