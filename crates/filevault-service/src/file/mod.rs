//! File operations of the [`FileStore`](crate::FileStore) façade.

pub mod delete;
pub mod download;
pub mod info;
pub mod request;
pub mod upload;

pub use download::DownloadResult;
pub use request::{FileQuery, UpdateAllRequest, UpdateInfoRequest, UploadRequest};
