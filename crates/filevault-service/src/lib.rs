//! # filevault-service
//!
//! The versioned file store. [`FileStore`] is the public façade; it checks
//! ownership with the [`OwnershipGuard`](filevault_auth::OwnershipGuard),
//! then drives the [`Ledger`], [`MetadataStore`], and blob store.
//!
//! Components are wired by constructor injection and shared through `Arc`.

pub mod catalog;
pub mod context;
pub mod file;
pub mod ledger;
pub mod metadata;
pub mod resolver;
pub mod store;

pub use catalog::{Catalog, CatalogSnapshot};
pub use context::RequestContext;
pub use file::{DownloadResult, FileQuery, UpdateAllRequest, UpdateInfoRequest, UploadRequest};
pub use ledger::{Ledger, LedgerEntry, LineageState, NewVersion, RemovedFiles};
pub use metadata::{BulkFailure, BulkUpdateReport, MetadataStore, VersionRef};
pub use resolver::Resolver;
pub use store::FileStore;
