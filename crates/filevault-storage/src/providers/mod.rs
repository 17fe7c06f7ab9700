//! Storage provider implementations.

use std::sync::Arc;

use filevault_core::config::StorageConfig;
use filevault_core::config::storage::ProviderKind;
use filevault_core::error::AppError;
use filevault_core::result::AppResult;
use filevault_core::traits::storage::StorageProvider;

#[cfg(feature = "local")]
pub mod local;
#[cfg(feature = "memory")]
pub mod memory;

#[cfg(feature = "local")]
pub use local::LocalStorageProvider;
#[cfg(feature = "memory")]
pub use memory::MemoryStorageProvider;

/// Construct the provider named by `config.provider`.
pub async fn build_provider(config: &StorageConfig) -> AppResult<Arc<dyn StorageProvider>> {
    match config.provider_kind()? {
        #[cfg(feature = "local")]
        ProviderKind::Local => {
            let root = config.local_root();
            let provider = LocalStorageProvider::new(&root).await?;
            Ok(Arc::new(provider))
        }
        #[cfg(feature = "memory")]
        ProviderKind::Memory => Ok(Arc::new(MemoryStorageProvider::new())),
        #[allow(unreachable_patterns)]
        other => Err(AppError::configuration(format!(
            "Storage provider {other:?} is not compiled into this build"
        ))),
    }
}
