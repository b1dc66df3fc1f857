//! The securable-object rule container.
//!
//! [`DirectoryObjectSecurity`] is the stateful owner of one security descriptor. It is the
//! only component that mutates the descriptor's DACL and SACL, and it presents consistent
//! point-in-time rule snapshots to readers. Every structural change flows through one of
//! twelve mutation entry points; every read flows through one of two query entry points.
//!
//! # Architecture
//!
//! The container wraps `{descriptor, sticky modified flags}` in a single reader/writer
//! lock scoped to the whole descriptor:
//!
//! - **Mutations** hold exclusive access for their entire body, including the
//!   absent-ACL materialization and the legacy-revision upgrade-clone, so no reader can
//!   observe a torn ACL mid-upgrade.
//! - **Queries** hold shared access only while the snapshot is built. The returned
//!   [`AuthorizationRuleCollection`] shares no storage with the live ACL and can be read
//!   without any lock, indefinitely.
//!
//! How rules are materialized from entries is not baked in: the container is generic over
//! a [`RuleFactory`], the capability a concrete securable-object type supplies to build
//! rules in its own vocabulary. [`StandardRuleFactory`] produces this crate's own rule
//! types for callers without a domain-specific one.
//!
//! # Mutation semantics
//!
//! For an absent ACL, removal-family operations are no-ops and everything else first
//! materializes an empty ACL at [`ACL_REVISION_DS`]. Applying an object-typed add / set /
//! reset to a legacy-revision ACL first clones it, entry for entry, into a
//! revision-upgraded ACL (the revision is the first byte of the binary form). The rule's
//! identity is resolved to the canonical SID kind exactly once per mutation.
//!
//! # Failure model
//!
//! Invalid arguments fail before any lock is taken. Identity translation failures
//! propagate unchanged. An unconditional purge reporting failure is an internal invariant
//! violation and panics. A panic mid-mutation poisons the lock and subsequent operations
//! report [`crate::Error::LockError`]; no rollback is attempted, the descriptor must be
//! treated as corrupted at that point.
//!
//! # Usage Examples
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use aclscope::identity::{AccountDirectory, IdentityKind, SecurityIdentifier};
//! use aclscope::objectsecurity::{DirectoryObjectSecurity, StandardRuleFactory};
//! use aclscope::rules::{AccessControlType, AccessRule, InheritanceFlags, PropagationFlags};
//!
//! let security = DirectoryObjectSecurity::new(
//!     Arc::new(AccountDirectory::new()),
//!     StandardRuleFactory,
//! );
//!
//! let rule = AccessRule::new(
//!     SecurityIdentifier::world().into(),
//!     0x1F01FF,
//!     false,
//!     InheritanceFlags::empty(),
//!     PropagationFlags::empty(),
//!     AccessControlType::Allow,
//! )?;
//!
//! security.add_access_rule(&rule)?;
//!
//! let rules = security.get_access_rules(true, true, IdentityKind::Sid)?;
//! assert_eq!(rules.len(), 1);
//! # Ok::<(), aclscope::Error>(())
//! ```

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, trace};
use uguid::Guid;

use crate::{
    acl::{
        Ace, AceQualifier, DiscretionaryAcl, ObjectAceFlags, RawAcl, SystemAcl, ACCESS_MASK_ALL,
        ACL_REVISION_DS,
    },
    descriptor::{ControlFlags, SecurityDescriptor},
    identity::{IdentityKind, IdentityReference, IdentityResolver, SecurityIdentifier},
    rules::{
        AccessControlModification, AccessControlType, AccessRule, AuditFlags, AuditRule,
        AuthorizationRuleCollection, InheritanceFlags, PropagationFlags,
    },
    Result,
};

/// The capability a concrete securable-object type supplies for materializing rules.
///
/// Query snapshots call back into the factory for every emitted entry, handing it the
/// entry's full tuple. Implementations build the rule in whatever vocabulary fits their
/// object model; the GUID pair is zero for entries without object scoping.
pub trait RuleFactory {
    /// Build an access rule from an entry's tuple
    ///
    /// # Errors
    /// Returns an error if the tuple violates the rule invariants (e.g. a zero mask from
    /// a malformed entry)
    #[allow(clippy::too_many_arguments)]
    fn access_rule(
        &self,
        identity: IdentityReference,
        access_mask: u32,
        is_inherited: bool,
        inheritance_flags: InheritanceFlags,
        propagation_flags: PropagationFlags,
        access_type: AccessControlType,
        object_type: Guid,
        inherited_object_type: Guid,
    ) -> Result<AccessRule>;

    /// Build an audit rule from an entry's tuple
    ///
    /// # Errors
    /// Returns an error if the tuple violates the rule invariants
    #[allow(clippy::too_many_arguments)]
    fn audit_rule(
        &self,
        identity: IdentityReference,
        access_mask: u32,
        is_inherited: bool,
        inheritance_flags: InheritanceFlags,
        propagation_flags: PropagationFlags,
        audit_flags: AuditFlags,
        object_type: Guid,
        inherited_object_type: Guid,
    ) -> Result<AuditRule>;
}

/// The stock factory: produces this crate's own [`AccessRule`] / [`AuditRule`] types.
///
/// Suitable whenever the caller has no domain-specific rule vocabulary of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRuleFactory;

impl RuleFactory for StandardRuleFactory {
    fn access_rule(
        &self,
        identity: IdentityReference,
        access_mask: u32,
        is_inherited: bool,
        inheritance_flags: InheritanceFlags,
        propagation_flags: PropagationFlags,
        access_type: AccessControlType,
        object_type: Guid,
        inherited_object_type: Guid,
    ) -> Result<AccessRule> {
        AccessRule::object_typed(
            identity,
            access_mask,
            is_inherited,
            inheritance_flags,
            propagation_flags,
            object_type,
            inherited_object_type,
            access_type,
        )
    }

    fn audit_rule(
        &self,
        identity: IdentityReference,
        access_mask: u32,
        is_inherited: bool,
        inheritance_flags: InheritanceFlags,
        propagation_flags: PropagationFlags,
        audit_flags: AuditFlags,
        object_type: Guid,
        inherited_object_type: Guid,
    ) -> Result<AuditRule> {
        AuditRule::object_typed(
            identity,
            access_mask,
            is_inherited,
            inheritance_flags,
            propagation_flags,
            object_type,
            inherited_object_type,
            audit_flags,
        )
    }
}

/// Everything guarded by the container's lock: the descriptor and the sticky flags
#[derive(Debug)]
struct SecurityState {
    descriptor: SecurityDescriptor,
    access_rules_modified: bool,
    audit_rules_modified: bool,
}

/// Either qualified ACL, viewed uniformly for snapshot construction
enum AclRef<'a> {
    Dacl(&'a DiscretionaryAcl),
    Sacl(&'a SystemAcl),
}

impl AclRef<'_> {
    fn count(&self) -> usize {
        match self {
            AclRef::Dacl(acl) => acl.count(),
            AclRef::Sacl(acl) => acl.count(),
        }
    }

    fn get(&self, index: usize) -> Result<Ace> {
        match self {
            AclRef::Dacl(acl) => acl.get(index),
            AclRef::Sacl(acl) => acl.get(index),
        }
    }
}

/// The securable-object rule container: one descriptor, one lock, twelve mutators.
///
/// See the [module documentation](self) for the architecture and failure model. The type
/// parameter is the [`RuleFactory`] used to materialize rules during queries.
pub struct DirectoryObjectSecurity<F: RuleFactory> {
    state: RwLock<SecurityState>,
    is_container: bool,
    is_ds: bool,
    resolver: Arc<dyn IdentityResolver>,
    factory: F,
}

impl<F: RuleFactory> DirectoryObjectSecurity<F> {
    /// Create a container around an empty descriptor.
    ///
    /// Directory objects are containers living in a directory service, so both nature
    /// flags are set; ACLs materialized later inherit them.
    pub fn new(resolver: Arc<dyn IdentityResolver>, factory: F) -> Self {
        Self::from_descriptor(SecurityDescriptor::new(), resolver, factory)
    }

    /// Create a container around an existing descriptor
    pub fn from_descriptor(
        descriptor: SecurityDescriptor,
        resolver: Arc<dyn IdentityResolver>,
        factory: F,
    ) -> Self {
        DirectoryObjectSecurity {
            state: RwLock::new(SecurityState {
                descriptor,
                access_rules_modified: false,
                audit_rules_modified: false,
            }),
            is_container: true,
            is_ds: true,
            resolver,
            factory,
        }
    }

    /// Create a container from a descriptor's self-relative binary form
    ///
    /// # Errors
    /// Returns an error if the binary form cannot be parsed
    pub fn from_binary_form(
        data: &[u8],
        resolver: Arc<dyn IdentityResolver>,
        factory: F,
    ) -> Result<Self> {
        let descriptor = SecurityDescriptor::from_bytes(true, true, data)?;
        Ok(Self::from_descriptor(descriptor, resolver, factory))
    }

    /// Whether the secured object can have children
    #[must_use]
    pub fn is_container(&self) -> bool {
        self.is_container
    }

    /// Whether the secured object lives in a directory service
    #[must_use]
    pub fn is_ds(&self) -> bool {
        self.is_ds
    }

    fn read_lock(&self) -> Result<RwLockReadGuard<'_, SecurityState>> {
        self.state.read().map_err(|_| crate::Error::LockError)
    }

    fn write_lock(&self) -> Result<RwLockWriteGuard<'_, SecurityState>> {
        self.state.write().map_err(|_| crate::Error::LockError)
    }

    // Mutation entry points. Each acquires exclusive access for its whole body and
    // OR-accumulates the per-kind sticky modified flag.

    /// Append an allow or deny entry for the rule; existing entries are never removed
    ///
    /// # Errors
    /// Returns an error on lock poisoning or identity translation failure
    pub fn add_access_rule(&self, rule: &AccessRule) -> Result<()> {
        let mut state = self.write_lock()?;
        self.modify_access(&mut state, AccessControlModification::Add, rule)?;
        Ok(())
    }

    /// Replace every entry for the rule's identity and qualifier with the single new entry
    ///
    /// # Errors
    /// Returns an error on lock poisoning or identity translation failure
    pub fn set_access_rule(&self, rule: &AccessRule) -> Result<()> {
        let mut state = self.write_lock()?;
        self.modify_access(&mut state, AccessControlModification::Set, rule)?;
        Ok(())
    }

    /// Strip opposite-qualifier entries for the rule's identity, then set the rule
    ///
    /// # Errors
    /// Returns an error on lock poisoning or identity translation failure
    pub fn reset_access_rule(&self, rule: &AccessRule) -> Result<()> {
        let mut state = self.write_lock()?;
        self.modify_access(&mut state, AccessControlModification::Reset, rule)?;
        Ok(())
    }

    /// Remove entries exactly matching the rule's full tuple
    ///
    /// Returns whether anything was removed; removing against an absent DACL is a no-op
    /// reporting `false`.
    ///
    /// # Errors
    /// Returns an error on lock poisoning or identity translation failure
    pub fn remove_access_rule(&self, rule: &AccessRule) -> Result<bool> {
        let mut state = self.write_lock()?;
        self.modify_access(&mut state, AccessControlModification::Remove, rule)
    }

    /// Remove every entry for the rule's identity under its qualifier
    ///
    /// # Errors
    /// Returns an error on lock poisoning or identity translation failure
    pub fn remove_access_rule_all(&self, rule: &AccessRule) -> Result<()> {
        let mut state = self.write_lock()?;
        self.modify_access(&mut state, AccessControlModification::RemoveAll, rule)?;
        Ok(())
    }

    /// Remove entries exactly matching the rule's full tuple, without reporting a result
    ///
    /// # Errors
    /// Returns an error on lock poisoning or identity translation failure
    pub fn remove_access_rule_specific(&self, rule: &AccessRule) -> Result<()> {
        let mut state = self.write_lock()?;
        self.modify_access(&mut state, AccessControlModification::RemoveSpecific, rule)?;
        Ok(())
    }

    /// Append an audit entry for the rule; existing entries are never removed
    ///
    /// # Errors
    /// Returns an error on lock poisoning or identity translation failure
    pub fn add_audit_rule(&self, rule: &AuditRule) -> Result<()> {
        let mut state = self.write_lock()?;
        self.modify_audit(&mut state, AccessControlModification::Add, rule)?;
        Ok(())
    }

    /// Replace every audit entry for the rule's identity with the single new entry
    ///
    /// # Errors
    /// Returns an error on lock poisoning or identity translation failure
    pub fn set_audit_rule(&self, rule: &AuditRule) -> Result<()> {
        let mut state = self.write_lock()?;
        self.modify_audit(&mut state, AccessControlModification::Set, rule)?;
        Ok(())
    }

    /// Strip every audit entry for the rule's identity, then set the rule
    ///
    /// # Errors
    /// Returns an error on lock poisoning or identity translation failure
    pub fn reset_audit_rule(&self, rule: &AuditRule) -> Result<()> {
        let mut state = self.write_lock()?;
        self.modify_audit(&mut state, AccessControlModification::Reset, rule)?;
        Ok(())
    }

    /// Remove audit entries exactly matching the rule's full tuple
    ///
    /// Returns whether anything was removed; removing against an absent SACL is a no-op
    /// reporting `false`.
    ///
    /// # Errors
    /// Returns an error on lock poisoning or identity translation failure
    pub fn remove_audit_rule(&self, rule: &AuditRule) -> Result<bool> {
        let mut state = self.write_lock()?;
        self.modify_audit(&mut state, AccessControlModification::Remove, rule)
    }

    /// Remove every audit entry for the rule's identity
    ///
    /// # Errors
    /// Returns an error on lock poisoning or identity translation failure
    pub fn remove_audit_rule_all(&self, rule: &AuditRule) -> Result<()> {
        let mut state = self.write_lock()?;
        self.modify_audit(&mut state, AccessControlModification::RemoveAll, rule)?;
        Ok(())
    }

    /// Remove audit entries exactly matching the rule's full tuple, without a result
    ///
    /// # Errors
    /// Returns an error on lock poisoning or identity translation failure
    pub fn remove_audit_rule_specific(&self, rule: &AuditRule) -> Result<()> {
        let mut state = self.write_lock()?;
        self.modify_audit(&mut state, AccessControlModification::RemoveSpecific, rule)?;
        Ok(())
    }

    // Query entry points. Shared access for the duration of snapshot construction only.

    /// Snapshot the allow/deny rules, filtered and optionally translated
    ///
    /// Rule order equals ACE order; explicit and inherited entries are interleaved
    /// exactly as stored. An absent DACL yields an empty collection.
    ///
    /// # Arguments
    /// * `include_explicit` - Emit entries set directly on the object
    /// * `include_inherited` - Emit entries propagated from a parent
    /// * `target_kind` - Identity kind for the returned rules; non-canonical kinds are
    ///   translated in one batched resolver call
    ///
    /// # Errors
    /// Returns an error for an invalid target kind, lock poisoning, or translation failure
    pub fn get_access_rules(
        &self,
        include_explicit: bool,
        include_inherited: bool,
        target_kind: IdentityKind,
    ) -> Result<AuthorizationRuleCollection> {
        self.get_rules(true, include_explicit, include_inherited, target_kind)
    }

    /// Snapshot the audit rules, filtered and optionally translated
    ///
    /// The audit mirror of [`Self::get_access_rules`]; an absent SACL yields an empty
    /// collection.
    ///
    /// # Errors
    /// Returns an error for an invalid target kind, lock poisoning, or translation failure
    pub fn get_audit_rules(
        &self,
        include_explicit: bool,
        include_inherited: bool,
        target_kind: IdentityKind,
    ) -> Result<AuthorizationRuleCollection> {
        self.get_rules(false, include_explicit, include_inherited, target_kind)
    }

    /// Whether any access mutation since construction reported a modification
    ///
    /// The flag OR-accumulates across calls and is never cleared by reads.
    ///
    /// # Errors
    /// Returns an error on lock poisoning
    pub fn access_rules_modified(&self) -> Result<bool> {
        Ok(self.read_lock()?.access_rules_modified)
    }

    /// Whether any audit mutation since construction reported a modification
    ///
    /// # Errors
    /// Returns an error on lock poisoning
    pub fn audit_rules_modified(&self) -> Result<bool> {
        Ok(self.read_lock()?.audit_rules_modified)
    }

    /// The owner SID of the secured object, if any
    ///
    /// # Errors
    /// Returns an error on lock poisoning
    pub fn owner(&self) -> Result<Option<SecurityIdentifier>> {
        Ok(self.read_lock()?.descriptor.owner().cloned())
    }

    /// Replace the owner SID
    ///
    /// # Errors
    /// Returns an error on lock poisoning
    pub fn set_owner(&self, owner: Option<SecurityIdentifier>) -> Result<()> {
        self.write_lock()?.descriptor.set_owner(owner);
        Ok(())
    }

    /// The primary group SID of the secured object, if any
    ///
    /// # Errors
    /// Returns an error on lock poisoning
    pub fn group(&self) -> Result<Option<SecurityIdentifier>> {
        Ok(self.read_lock()?.descriptor.group().cloned())
    }

    /// Replace the primary group SID
    ///
    /// # Errors
    /// Returns an error on lock poisoning
    pub fn set_group(&self, group: Option<SecurityIdentifier>) -> Result<()> {
        self.write_lock()?.descriptor.set_group(group);
        Ok(())
    }

    /// Serialize the descriptor into its self-relative binary form
    ///
    /// # Errors
    /// Returns an error on lock poisoning or if an ACL exceeds its wire format limits
    pub fn security_descriptor_binary_form(&self) -> Result<Vec<u8>> {
        self.read_lock()?.descriptor.get_binary_form()
    }

    /// Apply one modification to the DACL. Caller holds exclusive access.
    fn modify_access(
        &self,
        state: &mut SecurityState,
        modification: AccessControlModification,
        rule: &AccessRule,
    ) -> Result<bool> {
        if state.descriptor.discretionary_acl().is_none() {
            if modification.is_removal() {
                return Ok(false);
            }

            debug!(
                "materializing empty DACL at revision {} for {:?}",
                ACL_REVISION_DS, modification
            );
            state.descriptor.set_discretionary_acl(Some(DiscretionaryAcl::new(
                self.is_container,
                self.is_ds,
                ACL_REVISION_DS,
            )));
            state
                .descriptor
                .add_control_flags(ControlFlags::DISCRETIONARY_ACL_PRESENT);
        } else if !modification.is_removal() && rule.is_object_rule() {
            // An object ACE is about to land; a legacy-revision DACL must be cloned into
            // an upgraded one first, entries preserved, before the edit is applied.
            if let Some(dacl) = state.descriptor.discretionary_acl() {
                if dacl.revision() < ACL_REVISION_DS {
                    debug!(
                        "upgrading DACL revision {} -> {} for an object-typed rule",
                        dacl.revision(),
                        ACL_REVISION_DS
                    );

                    let mut binary = dacl.get_binary_form()?;
                    binary[0] = ACL_REVISION_DS; // revision is the first byte of the binary form

                    state.descriptor.set_discretionary_acl(Some(DiscretionaryAcl::from_raw(
                        self.is_container,
                        self.is_ds,
                        RawAcl::from_bytes(&binary)?,
                    )));
                }
            }
        }

        let sid = self.canonical_sid(rule.identity())?;

        let Some(dacl) = state.descriptor.discretionary_acl_mut() else {
            unreachable!("the DACL was materialized above");
        };

        let access_type = rule.access_control_type();
        let modified = match modification {
            AccessControlModification::Add => {
                dacl.add_access(
                    access_type,
                    &sid,
                    rule.access_mask(),
                    rule.inheritance_flags(),
                    rule.propagation_flags(),
                    rule.object_flags(),
                    rule.object_type(),
                    rule.inherited_object_type(),
                );
                true
            }
            AccessControlModification::Set => {
                dacl.set_access(
                    access_type,
                    &sid,
                    rule.access_mask(),
                    rule.inheritance_flags(),
                    rule.propagation_flags(),
                    rule.object_flags(),
                    rule.object_type(),
                    rule.inherited_object_type(),
                );
                true
            }
            AccessControlModification::Reset => {
                dacl.remove_access(
                    access_type.opposite(),
                    &sid,
                    ACCESS_MASK_ALL,
                    InheritanceFlags::CONTAINER_INHERIT,
                    PropagationFlags::empty(),
                    ObjectAceFlags::empty(),
                    Guid::ZERO,
                    Guid::ZERO,
                );
                dacl.set_access(
                    access_type,
                    &sid,
                    rule.access_mask(),
                    rule.inheritance_flags(),
                    rule.propagation_flags(),
                    rule.object_flags(),
                    rule.object_type(),
                    rule.inherited_object_type(),
                );
                true
            }
            AccessControlModification::Remove => dacl.remove_access(
                access_type,
                &sid,
                rule.access_mask(),
                rule.inheritance_flags(),
                rule.propagation_flags(),
                rule.object_flags(),
                rule.object_type(),
                rule.inherited_object_type(),
            ),
            AccessControlModification::RemoveAll => {
                let purged = dacl.remove_access(
                    access_type,
                    &sid,
                    ACCESS_MASK_ALL,
                    InheritanceFlags::CONTAINER_INHERIT,
                    PropagationFlags::empty(),
                    ObjectAceFlags::empty(),
                    Guid::ZERO,
                    Guid::ZERO,
                );
                if !purged {
                    panic!("unconditional DACL purge reported failure");
                }
                true
            }
            AccessControlModification::RemoveSpecific => {
                dacl.remove_access_specific(
                    access_type,
                    &sid,
                    rule.access_mask(),
                    rule.inheritance_flags(),
                    rule.propagation_flags(),
                    rule.object_flags(),
                    rule.object_type(),
                    rule.inherited_object_type(),
                );
                true
            }
        };

        trace!("DACL {:?} for {} -> modified={}", modification, sid, modified);
        state.access_rules_modified |= modified;
        Ok(modified)
    }

    /// Apply one modification to the SACL. Caller holds exclusive access.
    fn modify_audit(
        &self,
        state: &mut SecurityState,
        modification: AccessControlModification,
        rule: &AuditRule,
    ) -> Result<bool> {
        if state.descriptor.system_acl().is_none() {
            if modification.is_removal() {
                return Ok(false);
            }

            debug!(
                "materializing empty SACL at revision {} for {:?}",
                ACL_REVISION_DS, modification
            );
            state.descriptor.set_system_acl(Some(SystemAcl::new(
                self.is_container,
                self.is_ds,
                ACL_REVISION_DS,
            )));
            state
                .descriptor
                .add_control_flags(ControlFlags::SYSTEM_ACL_PRESENT);
        } else if !modification.is_removal() && rule.is_object_rule() {
            if let Some(sacl) = state.descriptor.system_acl() {
                if sacl.revision() < ACL_REVISION_DS {
                    debug!(
                        "upgrading SACL revision {} -> {} for an object-typed rule",
                        sacl.revision(),
                        ACL_REVISION_DS
                    );

                    let mut binary = sacl.get_binary_form()?;
                    binary[0] = ACL_REVISION_DS; // revision is the first byte of the binary form

                    state.descriptor.set_system_acl(Some(SystemAcl::from_raw(
                        self.is_container,
                        self.is_ds,
                        RawAcl::from_bytes(&binary)?,
                    )));
                }
            }
        }

        let sid = self.canonical_sid(rule.identity())?;

        let Some(sacl) = state.descriptor.system_acl_mut() else {
            unreachable!("the SACL was materialized above");
        };

        let modified = match modification {
            AccessControlModification::Add => {
                sacl.add_audit(
                    rule.audit_flags(),
                    &sid,
                    rule.access_mask(),
                    rule.inheritance_flags(),
                    rule.propagation_flags(),
                    rule.object_flags(),
                    rule.object_type(),
                    rule.inherited_object_type(),
                );
                true
            }
            AccessControlModification::Set => {
                sacl.set_audit(
                    rule.audit_flags(),
                    &sid,
                    rule.access_mask(),
                    rule.inheritance_flags(),
                    rule.propagation_flags(),
                    rule.object_flags(),
                    rule.object_type(),
                    rule.inherited_object_type(),
                );
                true
            }
            AccessControlModification::Reset => {
                sacl.remove_audit(
                    AuditFlags::SUCCESS | AuditFlags::FAILURE,
                    &sid,
                    ACCESS_MASK_ALL,
                    InheritanceFlags::CONTAINER_INHERIT,
                    PropagationFlags::empty(),
                    ObjectAceFlags::empty(),
                    Guid::ZERO,
                    Guid::ZERO,
                );
                sacl.set_audit(
                    rule.audit_flags(),
                    &sid,
                    rule.access_mask(),
                    rule.inheritance_flags(),
                    rule.propagation_flags(),
                    rule.object_flags(),
                    rule.object_type(),
                    rule.inherited_object_type(),
                );
                true
            }
            AccessControlModification::Remove => sacl.remove_audit(
                rule.audit_flags(),
                &sid,
                rule.access_mask(),
                rule.inheritance_flags(),
                rule.propagation_flags(),
                rule.object_flags(),
                rule.object_type(),
                rule.inherited_object_type(),
            ),
            AccessControlModification::RemoveAll => {
                let purged = sacl.remove_audit(
                    AuditFlags::SUCCESS | AuditFlags::FAILURE,
                    &sid,
                    ACCESS_MASK_ALL,
                    InheritanceFlags::CONTAINER_INHERIT,
                    PropagationFlags::empty(),
                    ObjectAceFlags::empty(),
                    Guid::ZERO,
                    Guid::ZERO,
                );
                if !purged {
                    panic!("unconditional SACL purge reported failure");
                }
                true
            }
            AccessControlModification::RemoveSpecific => {
                sacl.remove_audit_specific(
                    rule.audit_flags(),
                    &sid,
                    rule.access_mask(),
                    rule.inheritance_flags(),
                    rule.propagation_flags(),
                    rule.object_flags(),
                    rule.object_type(),
                    rule.inherited_object_type(),
                );
                true
            }
        };

        trace!("SACL {:?} for {} -> modified={}", modification, sid, modified);
        state.audit_rules_modified |= modified;
        Ok(modified)
    }

    /// Resolve a rule's identity to the canonical SID kind, exactly once per mutation
    fn canonical_sid(&self, identity: &IdentityReference) -> Result<SecurityIdentifier> {
        match self.resolver.translate(identity, IdentityKind::Sid)? {
            IdentityReference::Sid(sid) => Ok(sid),
            other => Err(crate::Error::Error(format!(
                "identity resolver returned non-SID canonical identity '{}'",
                other
            ))),
        }
    }

    /// Whether `ace` participates in a snapshot of the requested kind
    fn wanted(ace: &Ace, access: bool) -> bool {
        let Some(qualifier) = ace.qualifier() else {
            return false;
        };

        if ace.is_callback() {
            return false;
        }

        if access {
            matches!(
                qualifier,
                AceQualifier::AccessAllowed | AceQualifier::AccessDenied
            )
        } else {
            qualifier == AceQualifier::SystemAudit
        }
    }

    fn get_rules(
        &self,
        access: bool,
        include_explicit: bool,
        include_inherited: bool,
        target_kind: IdentityKind,
    ) -> Result<AuthorizationRuleCollection> {
        if !self.resolver.is_valid_target_kind(target_kind) {
            return Err(crate::Error::InvalidTargetKind(target_kind));
        }

        let state = self.read_lock()?;
        let mut result = AuthorizationRuleCollection::new();

        let control = state.descriptor.control_flags();
        let acl = if access {
            if control.contains(ControlFlags::DISCRETIONARY_ACL_PRESENT) {
                state.descriptor.discretionary_acl().map(AclRef::Dacl)
            } else {
                None
            }
        } else if control.contains(ControlFlags::SYSTEM_ACL_PRESENT) {
            state.descriptor.system_acl().map(AclRef::Sacl)
        } else {
            None
        };

        let Some(acl) = acl else {
            // The required ACL is not present; an empty collection, not an error
            return Ok(result);
        };

        // First pass: gather the identities of every participating entry so that the
        // resolver sees them as one batch.
        let translated = if target_kind == IdentityKind::Sid {
            None
        } else {
            let mut source = Vec::with_capacity(acl.count());
            for index in 0..acl.count() {
                let ace = acl.get(index)?;
                if Self::wanted(&ace, access) {
                    source.push(IdentityReference::Sid(ace.security_identifier().clone()));
                }
            }

            trace!(
                "translating {} snapshot identities to {:?}",
                source.len(),
                target_kind
            );
            Some(self.resolver.translate_all(&source, target_kind)?)
        };

        // Second pass: same order, same participation test, so `cursor` stays aligned
        // with the translation batch built above.
        let mut cursor = 0;
        for index in 0..acl.count() {
            let ace = acl.get(index)?;
            if !Self::wanted(&ace, access) {
                continue;
            }

            let batch_index = cursor;
            cursor += 1;

            let inherited = ace.is_inherited();
            if !((include_explicit && !inherited) || (include_inherited && inherited)) {
                continue;
            }

            let identity = match &translated {
                Some(identities) => identities[batch_index].clone(),
                None => IdentityReference::Sid(ace.security_identifier().clone()),
            };

            if access {
                let access_type = if ace.qualifier() == Some(AceQualifier::AccessAllowed) {
                    AccessControlType::Allow
                } else {
                    AccessControlType::Deny
                };

                result.add_rule(
                    self.factory
                        .access_rule(
                            identity,
                            ace.access_mask(),
                            inherited,
                            ace.inheritance_flags(),
                            ace.propagation_flags(),
                            access_type,
                            ace.object_type(),
                            ace.inherited_object_type(),
                        )?
                        .into(),
                );
            } else {
                result.add_rule(
                    self.factory
                        .audit_rule(
                            identity,
                            ace.access_mask(),
                            inherited,
                            ace.inheritance_flags(),
                            ace.propagation_flags(),
                            ace.audit_flags(),
                            ace.object_type(),
                            ace.inherited_object_type(),
                        )?
                        .into(),
                );
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::AccountDirectory;

    fn container() -> DirectoryObjectSecurity<StandardRuleFactory> {
        DirectoryObjectSecurity::new(Arc::new(AccountDirectory::new()), StandardRuleFactory)
    }

    fn allow_rule(mask: u32) -> AccessRule {
        AccessRule::new(
            SecurityIdentifier::world().into(),
            mask,
            false,
            InheritanceFlags::empty(),
            PropagationFlags::empty(),
            AccessControlType::Allow,
        )
        .unwrap()
    }

    #[test]
    fn new_container_has_no_acls() {
        let security = container();
        assert!(security.get_access_rules(true, true, IdentityKind::Sid).unwrap().is_empty());
        assert!(security.get_audit_rules(true, true, IdentityKind::Sid).unwrap().is_empty());
        assert!(!security.access_rules_modified().unwrap());
        assert!(!security.audit_rules_modified().unwrap());
    }

    #[test]
    fn sticky_flags_accumulate_and_never_clear() {
        let security = container();
        let rule = allow_rule(0x20);

        // a no-op removal does not set the flag
        assert!(!security.remove_access_rule(&rule).unwrap());
        assert!(!security.access_rules_modified().unwrap());

        security.add_access_rule(&rule).unwrap();
        assert!(security.access_rules_modified().unwrap());

        // later no-op removals do not clear it
        assert!(!security.remove_access_rule(&allow_rule(0x40)).unwrap());
        assert!(security.access_rules_modified().unwrap());

        // audit flag is independent
        assert!(!security.audit_rules_modified().unwrap());
    }

    #[test]
    fn owner_and_group_roundtrip() {
        let security = container();
        assert!(security.owner().unwrap().is_none());

        security
            .set_owner(Some(SecurityIdentifier::builtin_administrators()))
            .unwrap();
        security.set_group(Some(SecurityIdentifier::local_system())).unwrap();

        assert_eq!(
            security.owner().unwrap(),
            Some(SecurityIdentifier::builtin_administrators())
        );
        assert_eq!(security.group().unwrap(), Some(SecurityIdentifier::local_system()));
    }

    #[test]
    fn binary_form_roundtrips_through_container() {
        let security = container();
        security.add_access_rule(&allow_rule(0x1F01FF)).unwrap();
        security.set_owner(Some(SecurityIdentifier::local_system())).unwrap();

        let bytes = security.security_descriptor_binary_form().unwrap();
        let restored = DirectoryObjectSecurity::from_binary_form(
            &bytes,
            Arc::new(AccountDirectory::new()),
            StandardRuleFactory,
        )
        .unwrap();

        let rules = restored.get_access_rules(true, true, IdentityKind::Sid).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].access_mask(), 0x1F01FF);
        assert_eq!(restored.owner().unwrap(), Some(SecurityIdentifier::local_system()));
    }
}
