//! Request context carrying the acting identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use filevault_auth::Identity;
use filevault_core::result::AppResult;
use filevault_core::types::RequestId;

/// Context for one store call.
///
/// Built by whatever authenticated the caller and passed into every
/// [`FileStore`](crate::FileStore) method so each operation knows *who* is
/// acting. `request_id` ties together the log lines of one call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The verified caller.
    pub identity: Identity,
    /// Correlation id for logging.
    pub request_id: RequestId,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            request_id: RequestId::new(),
            request_time: Utc::now(),
        }
    }

    /// Creates a context from a raw identity string.
    pub fn for_identity(identity: impl Into<String>) -> AppResult<Self> {
        Ok(Self::new(Identity::new(identity)?))
    }

    /// The acting identity as a string.
    pub fn identity(&self) -> &str {
        self.identity.as_str()
    }
}
