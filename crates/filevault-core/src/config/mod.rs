//! Application configuration schemas.
//!
//! Configuration is layered with the `config` crate: serde defaults, then
//! `config/default.toml`, then an optional explicit file, then environment
//! variables prefixed with `FILEVAULT__`. Each sub-module is one section.

pub mod logging;
pub mod storage;
pub mod store;

use serde::{Deserialize, Serialize};

pub use self::logging::LoggingConfig;
pub use self::storage::{LocalStorageConfig, StorageConfig};
pub use self::store::StoreConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Blob storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Ledger, catalog, and access policy settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files and the environment.
    ///
    /// `config/default.toml` is read if present; `path` (when given) is
    /// layered over it and must exist. Environment variables such as
    /// `FILEVAULT__STORAGE__PROVIDER=memory` take precedence over both.
    pub fn load(path: Option<&str>) -> Result<Self, AppError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false));

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("FILEVAULT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that deserialize cleanly but cannot work together.
    pub fn validate(&self) -> Result<(), AppError> {
        self.storage.provider_kind()?;
        if self.storage.max_upload_size_bytes == 0 {
            return Err(AppError::configuration(
                "storage.max_upload_size_bytes must be greater than zero",
            ));
        }
        if !matches!(self.logging.format.as_str(), "json" | "pretty" | "compact") {
            return Err(AppError::configuration(format!(
                "Unknown logging format '{}' (expected json, pretty, or compact)",
                self.logging.format
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage.provider, "local");
        assert!(!config.store.conceal_denials);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: AppConfig = toml_like("").expect("empty config");
        assert_eq!(config.storage.data_root, "./data");
        assert!(config.store.persist_catalog);
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let mut config = AppConfig::default();
        config.storage.provider = "tape".to_string();
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_section_override() {
        let config: AppConfig = toml_like(
            "[storage]\nprovider = \"memory\"\n[store]\nconceal_denials = true\n",
        )
        .expect("parse");
        assert_eq!(config.storage.provider, "memory");
        assert!(config.store.conceal_denials);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        let mut config = AppConfig::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    fn toml_like(source: &str) -> Result<AppConfig, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
