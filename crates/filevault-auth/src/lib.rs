//! # filevault-auth
//!
//! Authorization for the FileVault store. Authentication happens outside
//! the store; what arrives here is an already-verified [`Identity`].
//!
//! ## Modules
//!
//! - `action`: catalogue of store operations subject to authorization
//! - `guard`: exclusive-ownership policy enforcement
//! - `identity`: the verified caller identity

pub mod action;
pub mod guard;
pub mod identity;

pub use action::FileAction;
pub use guard::{AccessDecision, OwnershipGuard};
pub use identity::Identity;
