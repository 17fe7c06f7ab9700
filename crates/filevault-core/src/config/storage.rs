//! Blob storage configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// The storage backends a store can be opened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Files under `local.root_path`.
    Local,
    /// Process-local memory; contents vanish with the process.
    Memory,
}

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for all runtime data.
    #[serde(default = "default_data_root")]
    pub data_root: String,
    /// Storage provider holding blob content (`"local"` or `"memory"`).
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Maximum upload size in bytes (default 5 GB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// Local filesystem storage configuration.
    #[serde(default)]
    pub local: LocalStorageConfig,
}

impl StorageConfig {
    /// Parse the configured provider name.
    pub fn provider_kind(&self) -> Result<ProviderKind, AppError> {
        match self.provider.to_ascii_lowercase().as_str() {
            "local" => Ok(ProviderKind::Local),
            "memory" => Ok(ProviderKind::Memory),
            other => Err(AppError::configuration(format!(
                "Unknown storage provider '{other}' (expected 'local' or 'memory')"
            ))),
        }
    }

    /// Resolve the local blob root, falling back to `<data_root>/blobs`.
    pub fn local_root(&self) -> PathBuf {
        match &self.local.root_path {
            Some(root) => PathBuf::from(root),
            None => PathBuf::from(&self.data_root).join("blobs"),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            provider: default_provider(),
            max_upload_size_bytes: default_max_upload(),
            local: LocalStorageConfig::default(),
        }
    }
}

/// Local filesystem storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalStorageConfig {
    /// Root path for blob files. Defaults to `<data_root>/blobs`.
    #[serde(default)]
    pub root_path: Option<String>,
}

fn default_data_root() -> String {
    "./data".to_string()
}

fn default_provider() -> String {
    "local".to_string()
}

fn default_max_upload() -> u64 {
    5_368_709_120 // 5 GB
}
