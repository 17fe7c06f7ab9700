//! File domain entities.

pub mod info;
pub mod key;
pub mod metadata;
pub mod selector;
pub mod version;

pub use info::{FileInfo, FileSummary};
pub use key::{FileKey, LineagePath};
pub use metadata::{MetadataDocument, MetadataPatch, VersionMetadata};
pub use selector::{LATEST_SENTINEL, VersionSelector};
pub use version::FileVersion;
