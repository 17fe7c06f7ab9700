//! # filevault-storage
//!
//! Storage provider implementations for FileVault (local filesystem and
//! in-memory) and the [`BlobStore`] that turns them into an immutable,
//! handle-addressed content store.

pub mod blob;
pub mod providers;

pub use blob::{BlobReceipt, BlobStore};
pub use providers::build_provider;
