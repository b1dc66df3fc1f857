//! Rule value objects - validated, immutable requests against an ACL.
//!
//! A rule is a normalized statement of intent: permit, deny or audit one identity's access.
//! Rules are constructed by callers (or by the rule factory while building query snapshots),
//! validated completely at construction time, consumed by a single container operation and
//! then discarded. No partially-constructed rule can exist: every invariant violation fails
//! the constructor before a value is produced.
//!
//! # Architecture
//!
//! Instead of a four-deep inheritance chain, the model is a closed set of two concrete
//! value types sharing one validated base record:
//!
//! - [`AccessRule`] - allow/deny, with an optional object-type GUID pair
//! - [`AuditRule`] - success/failure audit, with an optional object-type GUID pair
//!
//! Whether a rule is "object-typed" is not a separate type: it is carried by the derived
//! [`ObjectAceFlags`] field, which also decides whether the persisted ACE needs the
//! extended object layout. [`AuthorizationRule`] is the tagged union used as the element
//! type of query results.
//!
//! # Invariants
//!
//! - the access mask has at least one bit set
//! - audit rules carry at least one of success / failure
//! - propagation flags collapse to none when inheritance is none
//! - the object-type GUID is retained only when the mask contains an object-scopable
//!   right; the inherited-object-type GUID only when container inheritance is requested

use uguid::Guid;

use crate::{
    acl::{ObjectAceFlags, ACCESS_MASK_WITH_OBJECT_TYPE},
    identity::{IdentityKind, IdentityReference},
    rules::{AccessControlType, AuditFlags, InheritanceFlags, PropagationFlags},
    Result,
};

/// Validate the base record shared by access and audit rules
fn validate_base(identity: &IdentityReference, access_mask: u32) -> Result<()> {
    if access_mask == 0 {
        return Err(crate::Error::EmptyAccessMask);
    }

    if !identity.can_translate_to(IdentityKind::Sid) {
        return Err(crate::Error::InvalidIdentity(identity.to_string()));
    }

    Ok(())
}

/// Propagation is meaningless without inheritance and collapses to none
fn effective_propagation(
    inheritance_flags: InheritanceFlags,
    propagation_flags: PropagationFlags,
) -> PropagationFlags {
    if inheritance_flags.is_empty() {
        PropagationFlags::empty()
    } else {
        propagation_flags
    }
}

/// Apply the object-type retention rules and derive the presence flags.
///
/// This derivation is load-bearing: a non-empty result forces the extended object-ACE
/// binary layout when the rule is persisted.
fn derive_object_info(
    access_mask: u32,
    inheritance_flags: InheritanceFlags,
    object_type: Guid,
    inherited_object_type: Guid,
) -> (Guid, Guid, ObjectAceFlags) {
    let mut object_flags = ObjectAceFlags::empty();

    let object_type = if object_type != Guid::ZERO && (access_mask & ACCESS_MASK_WITH_OBJECT_TYPE) != 0 {
        object_flags |= ObjectAceFlags::OBJECT_TYPE_PRESENT;
        object_type
    } else {
        Guid::ZERO
    };

    let inherited_object_type = if inherited_object_type != Guid::ZERO
        && inheritance_flags.contains(InheritanceFlags::CONTAINER_INHERIT)
    {
        object_flags |= ObjectAceFlags::INHERITED_OBJECT_TYPE_PRESENT;
        inherited_object_type
    } else {
        Guid::ZERO
    };

    (object_type, inherited_object_type, object_flags)
}

/// An immutable, validated request to allow or deny one identity's access.
///
/// Construct common rules with [`AccessRule::new`] and object-typed (GUID-scoped) rules
/// with [`AccessRule::object_typed`]. Both run the full invariant set; a rule that exists
/// is always well-formed.
///
/// # Examples
///
/// ```rust
/// use aclscope::identity::SecurityIdentifier;
/// use aclscope::rules::{AccessControlType, AccessRule, InheritanceFlags, PropagationFlags};
///
/// let rule = AccessRule::new(
///     SecurityIdentifier::world().into(),
///     0x1F01FF,
///     false,
///     InheritanceFlags::CONTAINER_INHERIT,
///     PropagationFlags::empty(),
///     AccessControlType::Allow,
/// )?;
/// assert_eq!(rule.access_control_type(), AccessControlType::Allow);
/// assert!(!rule.is_object_rule());
/// # Ok::<(), aclscope::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRule {
    identity: IdentityReference,
    access_mask: u32,
    is_inherited: bool,
    inheritance_flags: InheritanceFlags,
    propagation_flags: PropagationFlags,
    access_type: AccessControlType,
    object_type: Guid,
    inherited_object_type: Guid,
    object_flags: ObjectAceFlags,
}

impl AccessRule {
    /// Create a common (not object-typed) access rule
    ///
    /// # Arguments
    /// * `identity` - The principal the rule applies to
    /// * `access_mask` - Requested rights, at least one bit
    /// * `is_inherited` - Whether the rule mirrors an entry propagated from a parent
    /// * `inheritance_flags` - How the entry flows to children
    /// * `propagation_flags` - Propagation behavior, collapsed to none without inheritance
    /// * `access_type` - Allow or deny
    ///
    /// # Errors
    /// Returns an error if the mask is zero or the identity cannot be normalized to a SID
    pub fn new(
        identity: IdentityReference,
        access_mask: u32,
        is_inherited: bool,
        inheritance_flags: InheritanceFlags,
        propagation_flags: PropagationFlags,
        access_type: AccessControlType,
    ) -> Result<Self> {
        Self::object_typed(
            identity,
            access_mask,
            is_inherited,
            inheritance_flags,
            propagation_flags,
            Guid::ZERO,
            Guid::ZERO,
            access_type,
        )
    }

    /// Create an access rule optionally scoped to object-type GUIDs
    ///
    /// The GUID pair is subject to the retention derivation: `object_type` survives only
    /// when the mask carries an object-scopable right, `inherited_object_type` only when
    /// container inheritance is requested. Collapsed GUIDs read back as [`Guid::ZERO`]
    /// and the rule behaves exactly like a common rule.
    ///
    /// # Errors
    /// Returns an error if the mask is zero or the identity cannot be normalized to a SID
    #[allow(clippy::too_many_arguments)]
    pub fn object_typed(
        identity: IdentityReference,
        access_mask: u32,
        is_inherited: bool,
        inheritance_flags: InheritanceFlags,
        propagation_flags: PropagationFlags,
        object_type: Guid,
        inherited_object_type: Guid,
        access_type: AccessControlType,
    ) -> Result<Self> {
        validate_base(&identity, access_mask)?;

        let (object_type, inherited_object_type, object_flags) =
            derive_object_info(access_mask, inheritance_flags, object_type, inherited_object_type);

        Ok(AccessRule {
            identity,
            access_mask,
            is_inherited,
            inheritance_flags,
            propagation_flags: effective_propagation(inheritance_flags, propagation_flags),
            access_type,
            object_type,
            inherited_object_type,
            object_flags,
        })
    }

    /// The principal this rule applies to
    #[must_use]
    pub fn identity(&self) -> &IdentityReference {
        &self.identity
    }

    /// The requested rights
    #[must_use]
    pub fn access_mask(&self) -> u32 {
        self.access_mask
    }

    /// Whether this rule mirrors an inherited entry
    #[must_use]
    pub fn is_inherited(&self) -> bool {
        self.is_inherited
    }

    /// How the entry flows to children
    #[must_use]
    pub fn inheritance_flags(&self) -> InheritanceFlags {
        self.inheritance_flags
    }

    /// Propagation behavior; always empty when inheritance is empty
    #[must_use]
    pub fn propagation_flags(&self) -> PropagationFlags {
        self.propagation_flags
    }

    /// Allow or deny
    #[must_use]
    pub fn access_control_type(&self) -> AccessControlType {
        self.access_type
    }

    /// The retained object-type GUID, or zero
    #[must_use]
    pub fn object_type(&self) -> Guid {
        self.object_type
    }

    /// The retained inherited-object-type GUID, or zero
    #[must_use]
    pub fn inherited_object_type(&self) -> Guid {
        self.inherited_object_type
    }

    /// Presence flags derived from the retained GUID pair
    #[must_use]
    pub fn object_flags(&self) -> ObjectAceFlags {
        self.object_flags
    }

    /// Whether this rule needs the extended object-ACE layout when persisted
    #[must_use]
    pub fn is_object_rule(&self) -> bool {
        !self.object_flags.is_empty()
    }
}

/// An immutable, validated request to audit one identity's access.
///
/// Mirrors [`AccessRule`] with an [`AuditFlags`] payload instead of allow/deny; the flags
/// must name at least one of the success / failure conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRule {
    identity: IdentityReference,
    access_mask: u32,
    is_inherited: bool,
    inheritance_flags: InheritanceFlags,
    propagation_flags: PropagationFlags,
    audit_flags: AuditFlags,
    object_type: Guid,
    inherited_object_type: Guid,
    object_flags: ObjectAceFlags,
}

impl AuditRule {
    /// Create a common (not object-typed) audit rule
    ///
    /// # Errors
    /// Returns an error if the mask is zero, the audit flags are empty, or the identity
    /// cannot be normalized to a SID
    pub fn new(
        identity: IdentityReference,
        access_mask: u32,
        is_inherited: bool,
        inheritance_flags: InheritanceFlags,
        propagation_flags: PropagationFlags,
        audit_flags: AuditFlags,
    ) -> Result<Self> {
        Self::object_typed(
            identity,
            access_mask,
            is_inherited,
            inheritance_flags,
            propagation_flags,
            Guid::ZERO,
            Guid::ZERO,
            audit_flags,
        )
    }

    /// Create an audit rule optionally scoped to object-type GUIDs
    ///
    /// The GUID pair is subject to the same retention derivation as
    /// [`AccessRule::object_typed`].
    ///
    /// # Errors
    /// Returns an error if the mask is zero, the audit flags are empty, or the identity
    /// cannot be normalized to a SID
    #[allow(clippy::too_many_arguments)]
    pub fn object_typed(
        identity: IdentityReference,
        access_mask: u32,
        is_inherited: bool,
        inheritance_flags: InheritanceFlags,
        propagation_flags: PropagationFlags,
        object_type: Guid,
        inherited_object_type: Guid,
        audit_flags: AuditFlags,
    ) -> Result<Self> {
        validate_base(&identity, access_mask)?;

        if audit_flags.is_empty() {
            return Err(crate::Error::EmptyAuditFlags);
        }

        let (object_type, inherited_object_type, object_flags) =
            derive_object_info(access_mask, inheritance_flags, object_type, inherited_object_type);

        Ok(AuditRule {
            identity,
            access_mask,
            is_inherited,
            inheritance_flags,
            propagation_flags: effective_propagation(inheritance_flags, propagation_flags),
            audit_flags,
            object_type,
            inherited_object_type,
            object_flags,
        })
    }

    /// The principal this rule applies to
    #[must_use]
    pub fn identity(&self) -> &IdentityReference {
        &self.identity
    }

    /// The audited rights
    #[must_use]
    pub fn access_mask(&self) -> u32 {
        self.access_mask
    }

    /// Whether this rule mirrors an inherited entry
    #[must_use]
    pub fn is_inherited(&self) -> bool {
        self.is_inherited
    }

    /// How the entry flows to children
    #[must_use]
    pub fn inheritance_flags(&self) -> InheritanceFlags {
        self.inheritance_flags
    }

    /// Propagation behavior; always empty when inheritance is empty
    #[must_use]
    pub fn propagation_flags(&self) -> PropagationFlags {
        self.propagation_flags
    }

    /// The audit conditions, never empty
    #[must_use]
    pub fn audit_flags(&self) -> AuditFlags {
        self.audit_flags
    }

    /// The retained object-type GUID, or zero
    #[must_use]
    pub fn object_type(&self) -> Guid {
        self.object_type
    }

    /// The retained inherited-object-type GUID, or zero
    #[must_use]
    pub fn inherited_object_type(&self) -> Guid {
        self.inherited_object_type
    }

    /// Presence flags derived from the retained GUID pair
    #[must_use]
    pub fn object_flags(&self) -> ObjectAceFlags {
        self.object_flags
    }

    /// Whether this rule needs the extended object-ACE layout when persisted
    #[must_use]
    pub fn is_object_rule(&self) -> bool {
        !self.object_flags.is_empty()
    }
}

/// Either kind of rule, the element type of query result collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationRule {
    /// An allow or deny rule from a discretionary ACL
    Access(AccessRule),
    /// An audit rule from a system ACL
    Audit(AuditRule),
}

impl AuthorizationRule {
    /// The principal this rule applies to
    #[must_use]
    pub fn identity(&self) -> &IdentityReference {
        match self {
            AuthorizationRule::Access(rule) => rule.identity(),
            AuthorizationRule::Audit(rule) => rule.identity(),
        }
    }

    /// The rights named by this rule
    #[must_use]
    pub fn access_mask(&self) -> u32 {
        match self {
            AuthorizationRule::Access(rule) => rule.access_mask(),
            AuthorizationRule::Audit(rule) => rule.access_mask(),
        }
    }

    /// Whether the backing entry was inherited from a parent
    #[must_use]
    pub fn is_inherited(&self) -> bool {
        match self {
            AuthorizationRule::Access(rule) => rule.is_inherited(),
            AuthorizationRule::Audit(rule) => rule.is_inherited(),
        }
    }

    /// How the entry flows to children
    #[must_use]
    pub fn inheritance_flags(&self) -> InheritanceFlags {
        match self {
            AuthorizationRule::Access(rule) => rule.inheritance_flags(),
            AuthorizationRule::Audit(rule) => rule.inheritance_flags(),
        }
    }

    /// Propagation behavior of the entry
    #[must_use]
    pub fn propagation_flags(&self) -> PropagationFlags {
        match self {
            AuthorizationRule::Access(rule) => rule.propagation_flags(),
            AuthorizationRule::Audit(rule) => rule.propagation_flags(),
        }
    }

    /// Borrow the access rule if this is one
    #[must_use]
    pub fn as_access(&self) -> Option<&AccessRule> {
        match self {
            AuthorizationRule::Access(rule) => Some(rule),
            AuthorizationRule::Audit(_) => None,
        }
    }

    /// Borrow the audit rule if this is one
    #[must_use]
    pub fn as_audit(&self) -> Option<&AuditRule> {
        match self {
            AuthorizationRule::Audit(rule) => Some(rule),
            AuthorizationRule::Access(_) => None,
        }
    }
}

impl From<AccessRule> for AuthorizationRule {
    fn from(rule: AccessRule) -> Self {
        AuthorizationRule::Access(rule)
    }
}

impl From<AuditRule> for AuthorizationRule {
    fn from(rule: AuditRule) -> Self {
        AuthorizationRule::Audit(rule)
    }
}
