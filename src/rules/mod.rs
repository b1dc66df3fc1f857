//! Rule value objects and their supporting vocabulary.
//!
//! This module provides the caller-facing model of the rule engine: immutable, validated
//! value objects describing one identity's allowed, denied or audited access, and the
//! ordered collection type queries hand back.
//!
//! # Architecture
//!
//! Rules are a closed set of two concrete value types over one shared base record
//! (identity, mask, inherited bit, inheritance and propagation flags), with the optional
//! object-type GUID pair folded into each type rather than modeled as separate subclasses.
//! All validation happens at construction time; see [`rule`] for the invariant list.
//!
//! # Key Components
//!
//! - [`AccessRule`] / [`AuditRule`] - the two rule value types
//! - [`AuthorizationRule`] - tagged union over both, element of query results
//! - [`AuthorizationRuleCollection`] - immutable ordered query result
//! - [`AccessControlType`], [`AuditFlags`], [`InheritanceFlags`], [`PropagationFlags`],
//!   [`AccessControlModification`] - the shared vocabulary
//!
//! # Usage Examples
//!
//! ```rust
//! use aclscope::identity::SecurityIdentifier;
//! use aclscope::rules::{AccessControlType, AccessRule, InheritanceFlags, PropagationFlags};
//!
//! let rule = AccessRule::new(
//!     SecurityIdentifier::builtin_administrators().into(),
//!     0x1F01FF,
//!     false,
//!     InheritanceFlags::CONTAINER_INHERIT | InheritanceFlags::OBJECT_INHERIT,
//!     PropagationFlags::empty(),
//!     AccessControlType::Allow,
//! )?;
//! assert_eq!(rule.access_mask(), 0x1F01FF);
//! # Ok::<(), aclscope::Error>(())
//! ```

mod collection;
mod rule;
mod types;

pub use collection::AuthorizationRuleCollection;
pub use rule::{AccessRule, AuditRule, AuthorizationRule};
pub use types::{
    AccessControlModification, AccessControlType, AuditFlags, InheritanceFlags, PropagationFlags,
};
