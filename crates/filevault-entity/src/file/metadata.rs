//! Per-version metadata documents and patches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use filevault_core::error::{AppError, ErrorKind};
use filevault_core::result::AppResult;

/// Free-form metadata attached to a version.
pub type MetadataDocument = serde_json::Map<String, Value>;

/// The mutable half of a version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionMetadata {
    /// Human-readable description supplied at upload or by a later patch.
    pub description: String,
    /// Arbitrary key/value metadata.
    #[serde(default)]
    pub document: MetadataDocument,
    /// When a patch last touched this version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl VersionMetadata {
    /// Fresh metadata for a newly uploaded version.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            document: MetadataDocument::new(),
            updated_at: None,
        }
    }

    /// Shallow-merge a patch into this document.
    ///
    /// Patch keys overwrite existing keys, `null` values remove the key, and
    /// keys absent from the patch are kept. Nested objects are replaced
    /// whole, not merged.
    pub fn apply(&mut self, patch: &MetadataPatch, at: DateTime<Utc>) {
        for (key, value) in &patch.document {
            if value.is_null() {
                self.document.remove(key);
            } else {
                self.document.insert(key.clone(), value.clone());
            }
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        self.updated_at = Some(at);
    }
}

/// A metadata change to apply to one or many versions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataPatch {
    /// Keys to set (or remove, when `null`).
    #[serde(default)]
    pub document: MetadataDocument,
    /// Replacement description, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MetadataPatch {
    /// Parse the `updatedMetadata` JSON text clients send.
    ///
    /// The text must be a JSON object.
    pub fn from_json_str(raw: &str) -> AppResult<Self> {
        let value: Value = serde_json::from_str(raw).map_err(|e| {
            AppError::with_source(
                ErrorKind::InvalidArgument,
                format!("updated metadata is not valid JSON: {e}"),
                e,
            )
        })?;
        Self::from_value(value)
    }

    /// Build a patch from an already-parsed JSON value.
    pub fn from_value(value: Value) -> AppResult<Self> {
        match value {
            Value::Object(document) => Ok(Self {
                document,
                description: None,
            }),
            other => Err(AppError::invalid_argument(format!(
                "updated metadata must be a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Also replace the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether applying this patch would change nothing but `updated_at`.
    pub fn is_empty(&self) -> bool {
        self.document.is_empty() && self.description.is_none()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shallow_merge_keeps_other_keys() {
        let mut meta = VersionMetadata::new("user1's file");
        meta.apply(
            &MetadataPatch::from_json_str(r#"{ "newKey": "newValue" }"#).unwrap(),
            Utc::now(),
        );
        meta.apply(
            &MetadataPatch::from_json_str(r#"{ "updatedKey": "updatedValue" }"#).unwrap(),
            Utc::now(),
        );

        assert_eq!(meta.document.get("newKey"), Some(&json!("newValue")));
        assert_eq!(meta.document.get("updatedKey"), Some(&json!("updatedValue")));
        assert_eq!(meta.description, "user1's file");
        assert!(meta.updated_at.is_some());
    }

    #[test]
    fn test_patch_overwrites_and_null_removes() {
        let mut meta = VersionMetadata::new("d");
        meta.apply(
            &MetadataPatch::from_value(json!({"a": 1, "b": {"x": 1}})).unwrap(),
            Utc::now(),
        );
        meta.apply(
            &MetadataPatch::from_value(json!({"a": null, "b": {"y": 2}})).unwrap(),
            Utc::now(),
        );

        assert!(!meta.document.contains_key("a"));
        assert_eq!(meta.document.get("b"), Some(&json!({"y": 2})));
    }

    #[test]
    fn test_description_replacement() {
        let mut meta = VersionMetadata::new("old");
        let patch = MetadataPatch::default().with_description("new");
        assert!(!patch.is_empty());
        meta.apply(&patch, Utc::now());
        assert_eq!(meta.description, "new");
    }

    #[test]
    fn test_non_object_patch_rejected() {
        for raw in ["[1,2]", "\"text\"", "42", "null", "{ not json"] {
            let err = MetadataPatch::from_json_str(raw).unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidArgument, "input {raw}");
        }
    }
}
