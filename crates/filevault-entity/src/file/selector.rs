//! Version selection: an explicit number or "latest".

use std::fmt;

use serde::{Deserialize, Serialize};

use filevault_core::error::AppError;

/// Wire value that selects the latest version.
pub const LATEST_SENTINEL: i64 = -1;

/// Which version of a lineage an operation addresses.
///
/// On the wire this is a plain integer where `-1` means [`VersionSelector::Latest`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum VersionSelector {
    /// The highest version number present at resolution time.
    #[default]
    Latest,
    /// One specific version number (always `>= 1`).
    Exact(u32),
}

impl VersionSelector {
    /// Parse a raw wire value.
    pub fn from_raw(raw: i64) -> Result<Self, AppError> {
        if raw == LATEST_SENTINEL {
            return Ok(Self::Latest);
        }
        if raw < 1 {
            return Err(AppError::invalid_argument(format!(
                "version must be positive or {LATEST_SENTINEL} for latest, got {raw}"
            )));
        }
        u32::try_from(raw)
            .map(Self::Exact)
            .map_err(|_| AppError::invalid_argument(format!("version {raw} is out of range")))
    }

    /// Encode back to the wire value.
    pub fn as_raw(&self) -> i64 {
        match self {
            Self::Latest => LATEST_SENTINEL,
            Self::Exact(v) => i64::from(*v),
        }
    }
}

impl TryFrom<i64> for VersionSelector {
    type Error = AppError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::from_raw(raw)
    }
}

impl From<VersionSelector> for i64 {
    fn from(selector: VersionSelector) -> i64 {
        selector.as_raw()
    }
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => write!(f, "latest"),
            Self::Exact(v) => write!(f, "v{v}"),
        }
    }
}
