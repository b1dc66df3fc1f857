//! Access-control lists and their entries.
//!
//! This module is the ACE/ACL layer of the library: the binary codec for MS-DTYP ACLs and
//! ACEs, and the qualified mutation semantics (supersede, exact removal, purge) the
//! securable-object container drives.
//!
//! # Architecture
//!
//! The layer is split along the line between syntax and semantics:
//!
//! - [`RawAcl`] and [`Ace`] are pure structure: an ordered entry list with a revision
//!   byte, faithful binary round-trips, no opinions about content
//! - [`DiscretionaryAcl`] and [`SystemAcl`] add the qualified semantics: which entries an
//!   add / set / remove touches, what an unconditional purge means, and the rule that
//!   inherited and callback entries are never edited
//!
//! ACE order is authoritative at every level. Nothing in this module sorts or
//! canonicalizes; a caller that needs a specific order must insert in that order.
//!
//! # Key Components
//!
//! - [`Ace`] - one entry: qualifier, principal, mask, header flags, optional GUID pair
//! - [`RawAcl`] - ordered entry list with the ACL wire codec
//! - [`DiscretionaryAcl`] / [`SystemAcl`] - allow/deny and audit mutation surfaces
//! - [`AceType`], [`AceQualifier`], [`AceFlags`], [`ObjectAceFlags`] - entry vocabulary
//! - [`ACL_REVISION`], [`ACL_REVISION_DS`] - revision gate for object-typed entries
//!
//! # Usage Examples
//!
//! ```rust
//! use aclscope::acl::{DiscretionaryAcl, ObjectAceFlags, ACL_REVISION_DS};
//! use aclscope::identity::SecurityIdentifier;
//! use aclscope::rules::{AccessControlType, InheritanceFlags, PropagationFlags};
//! use uguid::Guid;
//!
//! let mut dacl = DiscretionaryAcl::new(true, true, ACL_REVISION_DS);
//! dacl.add_access(
//!     AccessControlType::Deny,
//!     &SecurityIdentifier::world(),
//!     0x120089,
//!     InheritanceFlags::empty(),
//!     PropagationFlags::empty(),
//!     ObjectAceFlags::empty(),
//!     Guid::ZERO,
//!     Guid::ZERO,
//! );
//!
//! let bytes = dacl.get_binary_form()?;
//! assert_eq!(bytes[0], ACL_REVISION_DS);
//! # Ok::<(), aclscope::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! ACLs are plain owned data with no interior mutability; the securable-object container
//! serializes access to them under its descriptor-wide lock.

mod ace;
mod common;
mod raw;
mod types;

pub use ace::Ace;
pub use common::{DiscretionaryAcl, SystemAcl};
pub use raw::RawAcl;
pub use types::{
    ds_rights, AceFlags, AceQualifier, AceType, ObjectAceFlags, ACCESS_MASK_ALL,
    ACCESS_MASK_WITH_OBJECT_TYPE, ACL_REVISION, ACL_REVISION_DS,
};
