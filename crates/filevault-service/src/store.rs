//! The versioned file store façade.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use filevault_auth::{FileAction, OwnershipGuard};
use filevault_core::config::AppConfig;
use filevault_core::result::AppResult;
use filevault_core::traits::storage::StorageProvider;
use filevault_storage::{BlobStore, build_provider};

use crate::catalog::{Catalog, CatalogSnapshot};
use crate::context::RequestContext;
use crate::ledger::Ledger;
use crate::metadata::MetadataStore;
use crate::resolver::Resolver;

/// Versioned, multi-tenant file store.
///
/// Every operation checks ownership first and only then looks anything up.
/// The operations themselves live in the [`file`](crate::file) modules.
#[derive(Debug)]
pub struct FileStore {
    pub(crate) ledger: Arc<Ledger>,
    pub(crate) metadata: Arc<MetadataStore>,
    pub(crate) blobs: BlobStore,
    pub(crate) resolver: Resolver,
    pub(crate) guard: OwnershipGuard,
    catalog: Catalog,
    /// Whether the catalog is loaded on open and written by `persist`.
    persist_catalog: bool,
    /// Serializes catalog writes.
    persist_lock: Mutex<()>,
}

impl FileStore {
    /// Open a store with the provider named in `config`.
    pub async fn open(config: &AppConfig) -> AppResult<Self> {
        let provider = build_provider(&config.storage).await?;
        Self::open_with_provider(config, provider).await
    }

    /// Open a store over an existing provider.
    ///
    /// When `store.persist_catalog` is set and a catalog exists, the ledger
    /// and metadata are restored from it. A provider whose blobs die with
    /// the process never uses the catalog: a restored ledger would point
    /// at content that no longer exists.
    pub async fn open_with_provider(
        config: &AppConfig,
        provider: Arc<dyn StorageProvider>,
    ) -> AppResult<Self> {
        let catalog = Catalog::new(config.store.catalog_path(&config.storage.data_root));

        let persist_catalog = config.store.persist_catalog && provider.is_durable();
        if config.store.persist_catalog && !persist_catalog {
            warn!(
                provider = provider.provider_type(),
                "Provider is not durable; catalog persistence disabled"
            );
        }

        let snapshot = if persist_catalog {
            catalog.load().await?
        } else {
            None
        };
        let (ledger, metadata) = match snapshot {
            Some(snapshot) => snapshot.restore()?,
            None => (Ledger::new(), MetadataStore::new()),
        };
        let ledger = Arc::new(ledger);

        let store = Self {
            resolver: Resolver::new(Arc::clone(&ledger)),
            ledger,
            metadata: Arc::new(metadata),
            blobs: BlobStore::new(provider, config.storage.max_upload_size_bytes),
            guard: OwnershipGuard::new(config.store.conceal_denials),
            catalog,
            persist_catalog,
            persist_lock: Mutex::new(()),
        };

        info!(
            provider = store.blobs.provider_type(),
            catalog = %store.catalog.path().display(),
            persist_catalog,
            owners = store.ledger.owners().len(),
            "File store opened"
        );
        Ok(store)
    }

    /// Where [`persist`](Self::persist) writes.
    pub fn catalog_path(&self) -> &Path {
        self.catalog.path()
    }

    /// Whether [`persist`](Self::persist) writes anything.
    pub fn persists_catalog(&self) -> bool {
        self.persist_catalog
    }

    /// Write the ledger and metadata to the catalog file.
    ///
    /// Does nothing when catalog persistence is disabled.
    pub async fn persist(&self) -> AppResult<()> {
        if !self.persist_catalog {
            debug!("Catalog persistence disabled; nothing written");
            return Ok(());
        }
        let _guard = self.persist_lock.lock().await;
        let snapshot = CatalogSnapshot::capture(&self.ledger, &self.metadata).await;
        self.catalog.save(&snapshot).await
    }

    /// Check the blob backend.
    pub async fn health_check(&self) -> AppResult<bool> {
        self.blobs.health_check().await
    }

    pub(crate) fn authorize(
        &self,
        ctx: &RequestContext,
        owner: &str,
        action: FileAction,
    ) -> AppResult<()> {
        self.guard.require(&ctx.identity, owner, action)
    }
}
