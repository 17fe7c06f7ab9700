//! Exclusive-ownership authorization.
//!
//! Every owner's records are private to that owner: the acting identity must
//! equal the target owner for reads and writes alike. The check never looks
//! at stored state, so a denial carries no hint of whether the target exists.

use tracing::warn;

use filevault_core::error::AppError;
use filevault_core::result::AppResult;

use crate::action::FileAction;
use crate::identity::Identity;

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// The identity may perform the action.
    Allowed,
    /// The identity may not perform the action.
    Denied,
}

impl AccessDecision {
    /// Whether access was granted.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Checks that the acting identity owns the records it targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnershipGuard {
    /// Report denials as "not found" instead of "denied".
    conceal_denials: bool,
}

impl OwnershipGuard {
    /// Creates a guard.
    pub fn new(conceal_denials: bool) -> Self {
        Self { conceal_denials }
    }

    /// Decide whether `identity` may perform `action` on `target_owner`'s records.
    pub fn authorize(
        &self,
        identity: &Identity,
        target_owner: &str,
        _action: FileAction,
    ) -> AccessDecision {
        if identity.as_str() == target_owner {
            AccessDecision::Allowed
        } else {
            AccessDecision::Denied
        }
    }

    /// Like [`authorize`](Self::authorize), but returns an error on denial.
    ///
    /// The error message names neither the target owner nor any record.
    pub fn require(
        &self,
        identity: &Identity,
        target_owner: &str,
        action: FileAction,
    ) -> AppResult<()> {
        match self.authorize(identity, target_owner, action) {
            AccessDecision::Allowed => Ok(()),
            AccessDecision::Denied => {
                warn!(
                    identity = %identity,
                    target_owner,
                    action = action.as_str(),
                    "Access denied"
                );
                if self.conceal_denials {
                    Err(AppError::not_found("File not found"))
                } else {
                    Err(AppError::denied(format!(
                        "Not permitted to perform {action}"
                    )))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filevault_core::error::ErrorKind;

    fn alice() -> Identity {
        Identity::new("alice").unwrap()
    }

    #[test]
    fn test_owner_is_allowed_everything() {
        let guard = OwnershipGuard::default();
        for action in [
            FileAction::Upload,
            FileAction::GetInfo,
            FileAction::UpdateInfo,
            FileAction::UpdateAllInfo,
            FileAction::Download,
            FileAction::Delete,
            FileAction::DeleteAll,
            FileAction::ListVersions,
            FileAction::ListFiles,
        ] {
            assert!(guard.authorize(&alice(), "alice", action).is_allowed());
            guard.require(&alice(), "alice", action).unwrap();
        }
    }

    #[test]
    fn test_other_owner_denied_for_reads_too() {
        let guard = OwnershipGuard::default();
        assert_eq!(
            guard.authorize(&alice(), "bob", FileAction::GetInfo),
            AccessDecision::Denied
        );
        let err = guard
            .require(&alice(), "bob", FileAction::Download)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Denied);
        assert!(!err.message.contains("bob"));
    }

    #[test]
    fn test_owner_match_is_exact() {
        let guard = OwnershipGuard::default();
        assert!(!guard.authorize(&alice(), "Alice", FileAction::Delete).is_allowed());
        assert!(!guard.authorize(&alice(), "alice ", FileAction::Delete).is_allowed());
    }

    #[test]
    fn test_concealed_denial_reads_as_not_found() {
        let guard = OwnershipGuard::new(true);
        let err = guard
            .require(&alice(), "bob", FileAction::UpdateInfo)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[test]
    fn test_blank_identity_rejected() {
        let err = Identity::new("  ").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_action_names() {
        assert_eq!(FileAction::DeleteAll.as_str(), "file:delete_all");
        assert_eq!(FileAction::Upload.to_string(), "file:upload");
    }
}
