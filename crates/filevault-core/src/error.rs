//! Unified application error types for FileVault.
//!
//! Every crate maps its failures into [`AppError`] so that the store hands
//! its caller one typed outcome per operation. Nothing is retried
//! internally; [`ErrorKind::is_retryable`] tells the caller which failures
//! are worth trying again.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The key or version does not resolve.
    NotFound,
    /// The acting identity is not the target owner.
    Denied,
    /// A concurrent mutation invalidated an assumption (e.g. version already deleted).
    Conflict,
    /// Malformed key fields, a non-positive explicit version, or an unusable patch.
    InvalidArgument,
    /// The blob or metadata backend failed.
    StorageUnavailable,
    /// Configuration could not be loaded or is inconsistent.
    Configuration,
    /// A catalog or patch document could not be (de)serialized.
    Serialization,
    /// An invariant was broken inside the store.
    Internal,
}

impl ErrorKind {
    /// Whether a caller may reasonably retry the failed operation.
    ///
    /// Only backend failures are transient; everything else is deterministic.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageUnavailable)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Denied => write!(f, "DENIED"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::InvalidArgument => write!(f, "INVALID_ARGUMENT"),
            Self::StorageUnavailable => write!(f, "STORAGE_UNAVAILABLE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout FileVault.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a denied error.
    pub fn denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Denied, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    /// Create a storage-unavailable error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StorageUnavailable, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Attach an underlying cause to an existing error.
    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(cause));
        self
    }

    /// Whether this error is the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    /// Shorthand for `self.kind.is_retryable()`.
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        let kind = if err.kind() == std::io::ErrorKind::NotFound {
            ErrorKind::NotFound
        } else {
            ErrorKind::StorageUnavailable
        };
        Self::with_source(kind, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_storage_is_retryable() {
        assert!(ErrorKind::StorageUnavailable.is_retryable());
        for kind in [
            ErrorKind::NotFound,
            ErrorKind::Denied,
            ErrorKind::Conflict,
            ErrorKind::InvalidArgument,
            ErrorKind::Configuration,
            ErrorKind::Serialization,
            ErrorKind::Internal,
        ] {
            assert!(!kind.is_retryable(), "{kind} should not be retryable");
        }
    }

    #[test]
    fn test_io_not_found_maps_to_not_found() {
        let err: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.kind, ErrorKind::NotFound);

        let err: AppError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope").into();
        assert_eq!(err.kind, ErrorKind::StorageUnavailable);
    }

    #[test]
    fn test_display_includes_kind() {
        let err = AppError::denied("access denied");
        assert_eq!(err.to_string(), "DENIED: access denied");
    }

    #[test]
    fn test_clone_drops_source() {
        let io = std::io::Error::other("disk on fire");
        let err = AppError::with_source(ErrorKind::StorageUnavailable, "write failed", io);
        let cloned = err.clone();
        assert!(cloned.source.is_none());
        assert_eq!(cloned.kind, err.kind);
        assert_eq!(cloned.message, err.message);
    }
}
