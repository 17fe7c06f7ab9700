//! # filevault-entity
//!
//! Domain entity models for FileVault. Every struct in this crate is a
//! ledger record or a value object passed between the store's layers.
//! All entities derive `Debug`, `Clone`, `Serialize`, and `Deserialize`.

pub mod file;

pub use file::{
    FileInfo, FileKey, FileSummary, FileVersion, LATEST_SENTINEL, LineagePath, MetadataDocument,
    MetadataPatch, VersionMetadata, VersionSelector,
};
