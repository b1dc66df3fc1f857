//! Principal identities and their translation.
//!
//! This module provides the identity side of the rule engine: the canonical
//! [`SecurityIdentifier`] stored inside every ACE, the [`IdentityReference`] union callers
//! hand to rule constructors, and the [`IdentityResolver`] contract used to normalize and
//! translate identities.
//!
//! # Architecture
//!
//! Identities have exactly one canonical, on-wire form - the SID. Everything else is a
//! presentation kind. The securable-object container normalizes a rule's identity to a SID
//! once per mutation and translates a whole snapshot's identities in one batched resolver
//! call per query, so the resolver is the only component that ever consults the mapping
//! table.
//!
//! # Key Components
//!
//! - [`SecurityIdentifier`] - variable-length SID with binary and `S-1-...` string codecs
//! - [`IdentityReference`] / [`IdentityKind`] - the identity union and its kind tags
//! - [`IdentityResolver`] - translation contract (single and batched)
//! - [`AccountDirectory`] - in-process resolver over a registered lookup table
//!
//! # Usage Examples
//!
//! ```rust
//! use aclscope::identity::{AccountDirectory, IdentityKind, IdentityReference, IdentityResolver,
//!     SecurityIdentifier};
//!
//! let directory = AccountDirectory::new();
//! directory.register("S-1-5-21-1-2-3-500".parse()?, "DOMAIN\\Administrator");
//!
//! let sid = directory.translate(
//!     &IdentityReference::Account("DOMAIN\\Administrator".to_string()),
//!     IdentityKind::Sid,
//! )?;
//! assert_eq!(sid.to_string(), "S-1-5-21-1-2-3-500");
//! # Ok::<(), aclscope::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! All identity value types are immutable after construction and implement `Send + Sync`.
//! [`AccountDirectory`] supports concurrent registration and lookup.

mod reference;
mod resolver;
mod sid;

pub use reference::{IdentityKind, IdentityReference};
pub use resolver::{AccountDirectory, IdentityResolver};
pub use sid::{SecurityIdentifier, SID_MAX_SUB_AUTHORITIES, SID_REVISION};
