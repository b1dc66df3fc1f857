//! ACE-level enumerations, header flags and access-mask constants.
//!
//! Everything in here mirrors the on-wire vocabulary of MS-DTYP access-control entries:
//! the ACE type octet, the header flag bits, the object-ACE presence flags, and the ACL
//! revision constants that gate object-typed entries.

use bitflags::bitflags;
use strum::FromRepr;

use crate::rules::AuditFlags;

/// ACL revision for ACLs that carry only common ACEs
pub const ACL_REVISION: u8 = 2;

/// ACL revision required before object-typed (GUID-scoped) ACEs may be stored
pub const ACL_REVISION_DS: u8 = 4;

/// Sentinel access mask matching every entry regardless of its mask.
///
/// Used internally by the purge paths (reset and remove-all) to strike every entry for an
/// identity; it is not a valid mask for rule construction.
pub const ACCESS_MASK_ALL: u32 = u32::MAX;

/// Directory-service rights that can be scoped to a specific object type.
///
/// An object-type GUID is only meaningful when the access mask requests at least one of
/// these rights; rule construction collapses the GUID to zero otherwise, and the resulting
/// entry is persisted in the plain ACE layout.
pub const ACCESS_MASK_WITH_OBJECT_TYPE: u32 = ds_rights::CREATE_CHILD
    | ds_rights::DELETE_CHILD
    | ds_rights::SELF
    | ds_rights::READ_PROP
    | ds_rights::WRITE_PROP
    | ds_rights::CONTROL_ACCESS;

/// Access-mask bits for directory-service objects
///
/// These constants represent the per-right bits of the directory-service access mask,
/// the rights an object-typed ACE can scope down to a single attribute, child class or
/// extended operation.
pub mod ds_rights {
    /// Create child objects beneath this object
    pub const CREATE_CHILD: u32 = 0x0001;

    /// Delete child objects beneath this object
    pub const DELETE_CHILD: u32 = 0x0002;

    /// Enumerate the children of this object
    pub const LIST_CONTENTS: u32 = 0x0004;

    /// Perform validated writes to self
    pub const SELF: u32 = 0x0008;

    /// Read properties of this object
    pub const READ_PROP: u32 = 0x0010;

    /// Write properties of this object
    pub const WRITE_PROP: u32 = 0x0020;

    /// Delete this object and its entire subtree
    pub const DELETE_TREE: u32 = 0x0040;

    /// See this object in listings even without LIST_CONTENTS on the parent
    pub const LIST_OBJECT: u32 = 0x0080;

    /// Perform an extended (control) operation on this object
    pub const CONTROL_ACCESS: u32 = 0x0100;
}

/// The ACE type octet, first byte of every ACE header.
///
/// The object variants carry an extra GUID pair scoping the entry to a sub-object type;
/// the callback variants carry opaque conditional-expression data and are ignored by rule
/// queries. The compound type (0x04) is a reserved layout this library does not parse.
///
/// # Reference
/// * [MS-DTYP 2.4.4.1 - ACE_HEADER](https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-dtyp/628ebb1d-c509-4ea0-a10f-77ef97ca4586)
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u8)]
pub enum AceType {
    /// Grants access, plain layout
    AccessAllowed = 0x00,
    /// Denies access, plain layout
    AccessDenied = 0x01,
    /// Generates audit records, plain layout
    SystemAudit = 0x02,
    /// Generates alarms, plain layout (never produced by this library)
    SystemAlarm = 0x03,
    /// Reserved compound layout, unsupported
    AccessAllowedCompound = 0x04,
    /// Grants access, scoped by object-type GUIDs
    AccessAllowedObject = 0x05,
    /// Denies access, scoped by object-type GUIDs
    AccessDeniedObject = 0x06,
    /// Generates audit records, scoped by object-type GUIDs
    SystemAuditObject = 0x07,
    /// Generates alarms, scoped by object-type GUIDs
    SystemAlarmObject = 0x08,
    /// Grants access subject to a conditional expression
    AccessAllowedCallback = 0x09,
    /// Denies access subject to a conditional expression
    AccessDeniedCallback = 0x0A,
    /// Grants access, object-scoped and conditional
    AccessAllowedCallbackObject = 0x0B,
    /// Denies access, object-scoped and conditional
    AccessDeniedCallbackObject = 0x0C,
    /// Generates audit records subject to a conditional expression
    SystemAuditCallback = 0x0D,
    /// Generates alarms subject to a conditional expression
    SystemAlarmCallback = 0x0E,
    /// Generates audit records, object-scoped and conditional
    SystemAuditCallbackObject = 0x0F,
    /// Generates alarms, object-scoped and conditional
    SystemAlarmCallbackObject = 0x10,
}

impl AceType {
    /// The qualifier of this ACE type, if it has one
    ///
    /// The compound type has no qualifier and is the only `None` case.
    #[must_use]
    pub fn qualifier(self) -> Option<AceQualifier> {
        match self {
            AceType::AccessAllowed
            | AceType::AccessAllowedObject
            | AceType::AccessAllowedCallback
            | AceType::AccessAllowedCallbackObject => Some(AceQualifier::AccessAllowed),
            AceType::AccessDenied
            | AceType::AccessDeniedObject
            | AceType::AccessDeniedCallback
            | AceType::AccessDeniedCallbackObject => Some(AceQualifier::AccessDenied),
            AceType::SystemAudit
            | AceType::SystemAuditObject
            | AceType::SystemAuditCallback
            | AceType::SystemAuditCallbackObject => Some(AceQualifier::SystemAudit),
            AceType::SystemAlarm
            | AceType::SystemAlarmObject
            | AceType::SystemAlarmCallback
            | AceType::SystemAlarmCallbackObject => Some(AceQualifier::SystemAlarm),
            AceType::AccessAllowedCompound => None,
        }
    }

    /// Whether this type uses the object-ACE layout (object flags plus GUID pair)
    #[must_use]
    pub fn is_object_variant(self) -> bool {
        matches!(
            self,
            AceType::AccessAllowedObject
                | AceType::AccessDeniedObject
                | AceType::SystemAuditObject
                | AceType::SystemAlarmObject
                | AceType::AccessAllowedCallbackObject
                | AceType::AccessDeniedCallbackObject
                | AceType::SystemAuditCallbackObject
                | AceType::SystemAlarmCallbackObject
        )
    }

    /// Whether this type carries conditional-expression (callback) data
    #[must_use]
    pub fn is_callback_variant(self) -> bool {
        matches!(
            self,
            AceType::AccessAllowedCallback
                | AceType::AccessDeniedCallback
                | AceType::AccessAllowedCallbackObject
                | AceType::AccessDeniedCallbackObject
                | AceType::SystemAuditCallback
                | AceType::SystemAlarmCallback
                | AceType::SystemAuditCallbackObject
                | AceType::SystemAlarmCallbackObject
        )
    }

    /// The non-callback ACE type for a qualifier, in the plain or object layout
    #[must_use]
    pub(crate) fn for_qualifier(qualifier: AceQualifier, object_layout: bool) -> AceType {
        match (qualifier, object_layout) {
            (AceQualifier::AccessAllowed, false) => AceType::AccessAllowed,
            (AceQualifier::AccessAllowed, true) => AceType::AccessAllowedObject,
            (AceQualifier::AccessDenied, false) => AceType::AccessDenied,
            (AceQualifier::AccessDenied, true) => AceType::AccessDeniedObject,
            (AceQualifier::SystemAudit, false) => AceType::SystemAudit,
            (AceQualifier::SystemAudit, true) => AceType::SystemAuditObject,
            (AceQualifier::SystemAlarm, false) => AceType::SystemAlarm,
            (AceQualifier::SystemAlarm, true) => AceType::SystemAlarmObject,
        }
    }
}

/// What an ACE does: grant, deny, audit or alarm.
///
/// Queries match on this rather than on the raw type octet, so that plain, object and
/// callback variants of the same qualifier are treated uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AceQualifier {
    /// The entry grants the rights in its mask
    AccessAllowed,
    /// The entry withholds the rights in its mask
    AccessDenied,
    /// The entry generates audit records
    SystemAudit,
    /// The entry generates alarms (carried but never produced or queried)
    SystemAlarm,
}

bitflags! {
    /// The ACE header flag octet.
    ///
    /// The low nibble carries inheritance behavior, bit 4 marks entries propagated from a
    /// parent container, and the top two bits carry the audit conditions of system-audit
    /// entries.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AceFlags: u8 {
        /// Child leaf objects inherit this entry
        const OBJECT_INHERIT = 0x01;
        /// Child container objects inherit this entry
        const CONTAINER_INHERIT = 0x02;
        /// Inheritance stops after one generation
        const NO_PROPAGATE_INHERIT = 0x04;
        /// The entry does not apply to its own object, only to children
        const INHERIT_ONLY = 0x08;
        /// The entry was inherited from a parent rather than set explicitly
        const INHERITED = 0x10;
        /// Audit successful accesses (system-audit entries only)
        const SUCCESSFUL_ACCESS = 0x40;
        /// Audit failed accesses (system-audit entries only)
        const FAILED_ACCESS = 0x80;
    }
}

impl AceFlags {
    /// The audit conditions encoded in the top bits of this header flag octet
    #[must_use]
    pub fn audit_flags(self) -> AuditFlags {
        let mut audit = AuditFlags::empty();
        if self.contains(AceFlags::SUCCESSFUL_ACCESS) {
            audit |= AuditFlags::SUCCESS;
        }
        if self.contains(AceFlags::FAILED_ACCESS) {
            audit |= AuditFlags::FAILURE;
        }
        audit
    }
}

bitflags! {
    /// Presence flags for the GUID pair of an object ACE.
    ///
    /// Only GUIDs whose presence bit is set appear in the binary layout; an object ACE
    /// with neither bit set carries no GUIDs at all.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ObjectAceFlags: u32 {
        /// The object-type GUID is present
        const OBJECT_TYPE_PRESENT = 0x01;
        /// The inherited-object-type GUID is present
        const INHERITED_OBJECT_TYPE_PRESENT = 0x02;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ace_type_from_repr() {
        assert_eq!(AceType::from_repr(0x00), Some(AceType::AccessAllowed));
        assert_eq!(AceType::from_repr(0x05), Some(AceType::AccessAllowedObject));
        assert_eq!(AceType::from_repr(0x10), Some(AceType::SystemAlarmCallbackObject));
        assert_eq!(AceType::from_repr(0x11), None);
    }

    #[test]
    fn qualifier_classification() {
        assert_eq!(AceType::AccessAllowed.qualifier(), Some(AceQualifier::AccessAllowed));
        assert_eq!(AceType::AccessDeniedCallbackObject.qualifier(), Some(AceQualifier::AccessDenied));
        assert_eq!(AceType::SystemAuditObject.qualifier(), Some(AceQualifier::SystemAudit));
        assert_eq!(AceType::AccessAllowedCompound.qualifier(), None);
    }

    #[test]
    fn object_and_callback_variants() {
        assert!(AceType::SystemAuditObject.is_object_variant());
        assert!(!AceType::SystemAudit.is_object_variant());
        assert!(AceType::AccessAllowedCallback.is_callback_variant());
        assert!(!AceType::AccessAllowedObject.is_callback_variant());
        assert!(AceType::AccessAllowedCallbackObject.is_callback_variant());
        assert!(AceType::AccessAllowedCallbackObject.is_object_variant());
    }

    #[test]
    fn header_audit_bits() {
        let flags = AceFlags::SUCCESSFUL_ACCESS | AceFlags::FAILED_ACCESS;
        assert_eq!(flags.audit_flags(), AuditFlags::SUCCESS | AuditFlags::FAILURE);
        assert_eq!(AceFlags::CONTAINER_INHERIT.audit_flags(), AuditFlags::empty());
    }

    #[test]
    fn object_mask_composition() {
        assert_eq!(ACCESS_MASK_WITH_OBJECT_TYPE, 0x13B);
    }
}
