//! # aclscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the aclscope library. Import this module to get quick access to the essential
//! types for working with security descriptors and access-control rules.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all aclscope operations
pub use crate::Error;

/// The result type used throughout aclscope
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// The securable-object rule container and its factory capability
pub use crate::objectsecurity::{DirectoryObjectSecurity, RuleFactory, StandardRuleFactory};

// ================================================================================================
// Rule Model
// ================================================================================================

/// Rule value objects and query results
pub use crate::rules::{AccessRule, AuditRule, AuthorizationRule, AuthorizationRuleCollection};

/// Rule vocabulary: qualifiers, conditions, inheritance behavior, mutation kinds
pub use crate::rules::{
    AccessControlModification, AccessControlType, AuditFlags, InheritanceFlags, PropagationFlags,
};

// ================================================================================================
// Identities
// ================================================================================================

/// Identity value types and translation
pub use crate::identity::{
    AccountDirectory, IdentityKind, IdentityReference, IdentityResolver, SecurityIdentifier,
};

// ================================================================================================
// Descriptor and ACL Layer
// ================================================================================================

/// The security descriptor and its control word
pub use crate::descriptor::{ControlFlags, SecurityDescriptor};

/// ACE / ACL types for callers that need entry-level access
pub use crate::acl::{
    Ace, AceFlags, AceQualifier, AceType, DiscretionaryAcl, ObjectAceFlags, RawAcl, SystemAcl,
    ACL_REVISION, ACL_REVISION_DS,
};
