//! File identity: the (owner, project, name) triple.

use std::fmt;

use serde::{Deserialize, Serialize};

use filevault_core::error::AppError;
use filevault_core::result::AppResult;

/// Maximum length of any key field, in bytes.
pub const MAX_FIELD_LEN: usize = 255;

/// Identifies one file lineage.
///
/// `owner` is fixed at creation from the uploader's identity and never
/// changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileKey {
    /// Tenant that owns the lineage.
    pub owner: String,
    /// Namespace within the owner.
    pub project: String,
    /// Logical file name, including extension.
    pub name: String,
}

impl FileKey {
    /// Build a key from its three parts.
    pub fn new(
        owner: impl Into<String>,
        project: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            project: project.into(),
            name: name.into(),
        }
    }

    /// Check every field for emptiness, length, and control characters.
    pub fn validate(&self) -> AppResult<()> {
        validate_field("owner", &self.owner)?;
        validate_field("project", &self.project)?;
        validate_field("name", &self.name)?;
        Ok(())
    }

    /// The part of the key that locates a lineage inside its owner's partition.
    pub fn path(&self) -> LineagePath {
        LineagePath {
            project: self.project.clone(),
            name: self.name.clone(),
        }
    }

    /// Rebuild a full key from an owner and a partition-local path.
    pub fn from_path(owner: &str, path: &LineagePath) -> Self {
        Self::new(owner, path.project.clone(), path.name.clone())
    }
}

impl fmt::Display for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.owner, self.project, self.name)
    }
}

/// (project, name) within a single owner's partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineagePath {
    /// Namespace within the owner.
    pub project: String,
    /// Logical file name.
    pub name: String,
}

/// Validate one owner/project/name field.
pub fn validate_field(label: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::invalid_argument(format!("{label} cannot be empty")));
    }
    if value.len() > MAX_FIELD_LEN {
        return Err(AppError::invalid_argument(format!(
            "{label} exceeds {MAX_FIELD_LEN} bytes"
        )));
    }
    if value.chars().any(char::is_control) {
        return Err(AppError::invalid_argument(format!(
            "{label} contains control characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use filevault_core::error::ErrorKind;

    #[test]
    fn test_valid_key() {
        let key = FileKey::new("user1", "project1", "testfile.txt");
        assert!(key.validate().is_ok());
        assert_eq!(key.to_string(), "user1/project1/testfile.txt");
    }

    #[test]
    fn test_blank_fields_rejected() {
        for key in [
            FileKey::new("", "p", "n"),
            FileKey::new("o", "   ", "n"),
            FileKey::new("o", "p", ""),
        ] {
            let err = key.validate().unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidArgument);
        }
    }

    #[test]
    fn test_control_chars_and_length_rejected() {
        let err = FileKey::new("o", "p", "bad\nname").validate().unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);

        let long = "x".repeat(MAX_FIELD_LEN + 1);
        let err = FileKey::new("o", long, "n").validate().unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_path_roundtrip() {
        let key = FileKey::new("o", "p", "n.bin");
        let rebuilt = FileKey::from_path("o", &key.path());
        assert_eq!(rebuilt, key);
    }
}
