//! # filevault-core
//!
//! Core crate for FileVault. Contains the unified error system, the
//! layered configuration schema, typed identifiers, and the storage
//! provider trait implemented by `filevault-storage`.
//!
//! This crate has **no** internal dependencies on other FileVault crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
