//! Enumerations and flag sets shared by all rule value objects.
//!
//! These are the caller-facing vocabulary of the rule engine: allow/deny, success/failure,
//! inheritance and propagation behavior, and the closed set of mutation kinds dispatched by
//! the securable-object container.
//!
//! # Key Types
//! - [`AccessControlType`]: allow or deny qualifier for access rules
//! - [`AuditFlags`]: success / failure conditions for audit rules
//! - [`InheritanceFlags`], [`PropagationFlags`]: how an entry flows to children
//! - [`AccessControlModification`]: the mutation kinds understood by the container

use bitflags::bitflags;

/// Whether an access rule grants or denies the rights in its mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessControlType {
    /// The rule grants the rights in its access mask
    Allow = 0,
    /// The rule withholds the rights in its access mask
    Deny = 1,
}

impl AccessControlType {
    /// The opposite qualifier, used when a reset strips contrary entries
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            AccessControlType::Allow => AccessControlType::Deny,
            AccessControlType::Deny => AccessControlType::Allow,
        }
    }
}

/// The closed set of structural changes a rule can request against an ACL.
///
/// The container dispatches on this enum inside its exclusive section. Because the set is
/// closed at the type level, the "unrecognized modification" failure mode of looser type
/// systems is unrepresentable here; every match over it is exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessControlModification {
    /// Append a new entry, never removing existing ones
    Add = 0,
    /// Replace every entry for the identity and qualifier with the single new entry
    Set = 1,
    /// Strip contrary entries for the identity, then behave like `Set`
    Reset = 2,
    /// Remove entries exactly matching the full rule tuple
    Remove = 3,
    /// Remove every entry for the identity under the qualifier, regardless of mask or flags
    RemoveAll = 4,
    /// Remove entries exactly matching the full rule tuple, without a caller-visible result
    RemoveSpecific = 5,
}

impl AccessControlModification {
    /// Whether this modification only removes entries and must not create an absent ACL
    #[must_use]
    pub fn is_removal(self) -> bool {
        matches!(
            self,
            AccessControlModification::Remove
                | AccessControlModification::RemoveAll
                | AccessControlModification::RemoveSpecific
        )
    }
}

bitflags! {
    /// Audit conditions for a system-audit entry.
    ///
    /// Audit rules must carry at least one of these bits; an empty set fails rule
    /// construction since the resulting SACL entry could never fire.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AuditFlags: u8 {
        /// Generate an audit record when the access check succeeds
        const SUCCESS = 0x01;
        /// Generate an audit record when the access check fails
        const FAILURE = 0x02;
    }
}

bitflags! {
    /// How an entry is inherited by child objects of a container.
    ///
    /// With no bits set the entry applies only to the object it is attached to, and any
    /// propagation flags are meaningless (rule construction collapses them to none).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InheritanceFlags: u8 {
        /// Child container objects inherit the entry
        const CONTAINER_INHERIT = 0x01;
        /// Child leaf objects inherit the entry
        const OBJECT_INHERIT = 0x02;
    }
}

bitflags! {
    /// How inheritance propagates through the container hierarchy.
    ///
    /// Only meaningful when [`InheritanceFlags`] is non-empty.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PropagationFlags: u8 {
        /// The entry is inherited by immediate children only
        const NO_PROPAGATE_INHERIT = 0x01;
        /// The entry does not apply to the object itself, only to its children
        const INHERIT_ONLY = 0x02;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_access_type() {
        assert_eq!(AccessControlType::Allow.opposite(), AccessControlType::Deny);
        assert_eq!(AccessControlType::Deny.opposite(), AccessControlType::Allow);
    }

    #[test]
    fn removal_family() {
        assert!(AccessControlModification::Remove.is_removal());
        assert!(AccessControlModification::RemoveAll.is_removal());
        assert!(AccessControlModification::RemoveSpecific.is_removal());
        assert!(!AccessControlModification::Add.is_removal());
        assert!(!AccessControlModification::Set.is_removal());
        assert!(!AccessControlModification::Reset.is_removal());
    }

    #[test]
    fn audit_flag_bits() {
        let both = AuditFlags::SUCCESS | AuditFlags::FAILURE;
        assert_eq!(both.bits(), 0x03);
        assert!(AuditFlags::from_bits(0x04).is_none());
    }
}
