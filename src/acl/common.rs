//! Qualified ACLs: the DACL and SACL mutation semantics over a raw ACE list.
//!
//! [`DiscretionaryAcl`] and [`SystemAcl`] wrap the same core and expose the allow/deny and
//! audit mutation surfaces respectively. The collapsing semantics live here: `set`
//! supersedes prior entries for an identity, `remove` strikes exact tuples, and the
//! [`ACCESS_MASK_ALL`] sentinel turns a removal into an unconditional purge for the
//! identity under its qualifier.
//!
//! Inherited entries are never touched by any mutation - only explicit entries are
//! editable - and callback entries pass through all mutations untouched. Order is
//! preserved throughout: new entries append, removals shift, nothing ever sorts.

use uguid::Guid;

use crate::{
    acl::{Ace, AceFlags, AceQualifier, ObjectAceFlags, RawAcl, ACCESS_MASK_ALL},
    identity::SecurityIdentifier,
    rules::{AccessControlType, AuditFlags, InheritanceFlags, PropagationFlags},
    Result,
};

/// Build the ACE header flag octet from rule-level flags
fn ace_header_flags(
    inheritance_flags: InheritanceFlags,
    propagation_flags: PropagationFlags,
    audit_flags: AuditFlags,
) -> AceFlags {
    let mut flags = AceFlags::empty();

    if inheritance_flags.contains(InheritanceFlags::CONTAINER_INHERIT) {
        flags |= AceFlags::CONTAINER_INHERIT;
    }
    if inheritance_flags.contains(InheritanceFlags::OBJECT_INHERIT) {
        flags |= AceFlags::OBJECT_INHERIT;
    }
    if propagation_flags.contains(PropagationFlags::NO_PROPAGATE_INHERIT) {
        flags |= AceFlags::NO_PROPAGATE_INHERIT;
    }
    if propagation_flags.contains(PropagationFlags::INHERIT_ONLY) {
        flags |= AceFlags::INHERIT_ONLY;
    }
    if audit_flags.contains(AuditFlags::SUCCESS) {
        flags |= AceFlags::SUCCESSFUL_ACCESS;
    }
    if audit_flags.contains(AuditFlags::FAILURE) {
        flags |= AceFlags::FAILED_ACCESS;
    }

    flags
}

/// The shared machinery behind both qualified ACL kinds
#[derive(Debug, Clone, PartialEq, Eq)]
struct CommonAcl {
    raw: RawAcl,
    is_container: bool,
    is_ds: bool,
}

impl CommonAcl {
    fn new(is_container: bool, is_ds: bool, revision: u8) -> Self {
        CommonAcl {
            raw: RawAcl::new(revision),
            is_container,
            is_ds,
        }
    }

    fn from_raw(is_container: bool, is_ds: bool, raw: RawAcl) -> Self {
        CommonAcl {
            raw,
            is_container,
            is_ds,
        }
    }

    /// Whether `ace` is an explicit, non-callback entry for (qualifier, sid)
    fn is_editable_match(ace: &Ace, qualifier: AceQualifier, sid: &SecurityIdentifier) -> bool {
        !ace.is_inherited()
            && !ace.is_callback()
            && ace.qualifier() == Some(qualifier)
            && ace.security_identifier() == sid
    }

    #[allow(clippy::too_many_arguments)]
    fn add(
        &mut self,
        qualifier: AceQualifier,
        header_flags: AceFlags,
        sid: &SecurityIdentifier,
        access_mask: u32,
        object_flags: ObjectAceFlags,
        object_type: Guid,
        inherited_object_type: Guid,
    ) {
        self.raw.push(Ace::qualified(
            qualifier,
            header_flags,
            access_mask,
            sid.clone(),
            object_flags,
            object_type,
            inherited_object_type,
        ));
    }

    #[allow(clippy::too_many_arguments)]
    fn set(
        &mut self,
        qualifier: AceQualifier,
        header_flags: AceFlags,
        sid: &SecurityIdentifier,
        access_mask: u32,
        object_flags: ObjectAceFlags,
        object_type: Guid,
        inherited_object_type: Guid,
    ) {
        self.raw
            .retain(|ace| !Self::is_editable_match(ace, qualifier, sid));

        self.add(
            qualifier,
            header_flags,
            sid,
            access_mask,
            object_flags,
            object_type,
            inherited_object_type,
        );
    }

    /// Remove entries for (qualifier, sid).
    ///
    /// With [`ACCESS_MASK_ALL`] every editable entry for the identity is purged and the
    /// call always succeeds. With a concrete mask only entries matching the full
    /// (mask, header flags, object type pair) tuple are removed, and the return value
    /// reports whether anything was removed.
    #[allow(clippy::too_many_arguments)]
    fn remove(
        &mut self,
        qualifier: AceQualifier,
        header_flags: AceFlags,
        sid: &SecurityIdentifier,
        access_mask: u32,
        object_flags: ObjectAceFlags,
        object_type: Guid,
        inherited_object_type: Guid,
    ) -> bool {
        let purge = access_mask == ACCESS_MASK_ALL;
        let mut removed_any = false;

        self.raw.retain(|ace| {
            let matches = Self::is_editable_match(ace, qualifier, sid)
                && (purge
                    || (ace.access_mask() == access_mask
                        && ace.flags() == header_flags
                        && ace.object_flags() == object_flags
                        && ace.object_type() == object_type
                        && ace.inherited_object_type() == inherited_object_type));

            removed_any |= matches;
            !matches
        });

        // An unconditional purge is always representable
        purge || removed_any
    }
}

/// A discretionary ACL - the ordered allow/deny entry list of a security descriptor.
///
/// Exposes the codec contract the securable-object container consumes: append
/// ([`DiscretionaryAcl::add_access`]), supersede ([`DiscretionaryAcl::set_access`]),
/// exact or purge removal ([`DiscretionaryAcl::remove_access`],
/// [`DiscretionaryAcl::remove_access_specific`]), indexed defensive reads, and the
/// binary-form surface used by the revision upgrade path.
///
/// # Examples
///
/// ```rust
/// use aclscope::acl::{DiscretionaryAcl, ObjectAceFlags, ACL_REVISION};
/// use aclscope::identity::SecurityIdentifier;
/// use aclscope::rules::{AccessControlType, InheritanceFlags, PropagationFlags};
/// use uguid::Guid;
///
/// let mut dacl = DiscretionaryAcl::new(true, true, ACL_REVISION);
/// dacl.add_access(
///     AccessControlType::Allow,
///     &SecurityIdentifier::world(),
///     0x1F01FF,
///     InheritanceFlags::empty(),
///     PropagationFlags::empty(),
///     ObjectAceFlags::empty(),
///     Guid::ZERO,
///     Guid::ZERO,
/// );
/// assert_eq!(dacl.count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscretionaryAcl {
    inner: CommonAcl,
}

impl DiscretionaryAcl {
    /// Create an empty DACL at the given revision
    #[must_use]
    pub fn new(is_container: bool, is_ds: bool, revision: u8) -> Self {
        DiscretionaryAcl {
            inner: CommonAcl::new(is_container, is_ds, revision),
        }
    }

    /// Wrap an existing raw ACL, preserving its entries and revision
    #[must_use]
    pub fn from_raw(is_container: bool, is_ds: bool, raw: RawAcl) -> Self {
        DiscretionaryAcl {
            inner: CommonAcl::from_raw(is_container, is_ds, raw),
        }
    }

    /// Whether the owning object is a container
    #[must_use]
    pub fn is_container(&self) -> bool {
        self.inner.is_container
    }

    /// Whether the owning object lives in a directory service
    #[must_use]
    pub fn is_ds(&self) -> bool {
        self.inner.is_ds
    }

    /// The ACL revision byte
    #[must_use]
    pub fn revision(&self) -> u8 {
        self.inner.raw.revision()
    }

    /// Number of entries
    #[must_use]
    pub fn count(&self) -> usize {
        self.inner.raw.count()
    }

    /// A defensive copy of the entry at `index`
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `index` is past the end
    pub fn get(&self, index: usize) -> Result<Ace> {
        self.inner.raw.get(index)
    }

    /// Length in bytes of the binary representation
    #[must_use]
    pub fn binary_length(&self) -> usize {
        self.inner.raw.binary_length()
    }

    /// Serialize into the MS-DTYP ACL wire format
    ///
    /// # Errors
    /// Returns an error if the ACL exceeds the wire format's 16-bit limits
    pub fn get_binary_form(&self) -> Result<Vec<u8>> {
        self.inner.raw.get_binary_form()
    }

    /// Append an allow or deny entry; never removes anything
    #[allow(clippy::too_many_arguments)]
    pub fn add_access(
        &mut self,
        access_type: AccessControlType,
        sid: &SecurityIdentifier,
        access_mask: u32,
        inheritance_flags: InheritanceFlags,
        propagation_flags: PropagationFlags,
        object_flags: ObjectAceFlags,
        object_type: Guid,
        inherited_object_type: Guid,
    ) {
        self.inner.add(
            qualifier_for(access_type),
            ace_header_flags(inheritance_flags, propagation_flags, AuditFlags::empty()),
            sid,
            access_mask,
            object_flags,
            object_type,
            inherited_object_type,
        );
    }

    /// Supersede every explicit entry for (access type, identity) with the single new entry
    #[allow(clippy::too_many_arguments)]
    pub fn set_access(
        &mut self,
        access_type: AccessControlType,
        sid: &SecurityIdentifier,
        access_mask: u32,
        inheritance_flags: InheritanceFlags,
        propagation_flags: PropagationFlags,
        object_flags: ObjectAceFlags,
        object_type: Guid,
        inherited_object_type: Guid,
    ) {
        self.inner.set(
            qualifier_for(access_type),
            ace_header_flags(inheritance_flags, propagation_flags, AuditFlags::empty()),
            sid,
            access_mask,
            object_flags,
            object_type,
            inherited_object_type,
        );
    }

    /// Remove entries for (access type, identity)
    ///
    /// With [`ACCESS_MASK_ALL`] as the mask, purges every explicit entry for the identity
    /// and always returns `true`; otherwise removes entries matching the full tuple and
    /// returns whether anything was removed.
    #[allow(clippy::too_many_arguments)]
    pub fn remove_access(
        &mut self,
        access_type: AccessControlType,
        sid: &SecurityIdentifier,
        access_mask: u32,
        inheritance_flags: InheritanceFlags,
        propagation_flags: PropagationFlags,
        object_flags: ObjectAceFlags,
        object_type: Guid,
        inherited_object_type: Guid,
    ) -> bool {
        self.inner.remove(
            qualifier_for(access_type),
            ace_header_flags(inheritance_flags, propagation_flags, AuditFlags::empty()),
            sid,
            access_mask,
            object_flags,
            object_type,
            inherited_object_type,
        )
    }

    /// Remove entries matching the full tuple, without reporting a result
    #[allow(clippy::too_many_arguments)]
    pub fn remove_access_specific(
        &mut self,
        access_type: AccessControlType,
        sid: &SecurityIdentifier,
        access_mask: u32,
        inheritance_flags: InheritanceFlags,
        propagation_flags: PropagationFlags,
        object_flags: ObjectAceFlags,
        object_type: Guid,
        inherited_object_type: Guid,
    ) {
        self.inner.remove(
            qualifier_for(access_type),
            ace_header_flags(inheritance_flags, propagation_flags, AuditFlags::empty()),
            sid,
            access_mask,
            object_flags,
            object_type,
            inherited_object_type,
        );
    }
}

/// A system ACL - the ordered audit entry list of a security descriptor.
///
/// The audit mirror of [`DiscretionaryAcl`]: the qualifier is always system-audit and the
/// success / failure conditions travel in the ACE header flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemAcl {
    inner: CommonAcl,
}

impl SystemAcl {
    /// Create an empty SACL at the given revision
    #[must_use]
    pub fn new(is_container: bool, is_ds: bool, revision: u8) -> Self {
        SystemAcl {
            inner: CommonAcl::new(is_container, is_ds, revision),
        }
    }

    /// Wrap an existing raw ACL, preserving its entries and revision
    #[must_use]
    pub fn from_raw(is_container: bool, is_ds: bool, raw: RawAcl) -> Self {
        SystemAcl {
            inner: CommonAcl::from_raw(is_container, is_ds, raw),
        }
    }

    /// Whether the owning object is a container
    #[must_use]
    pub fn is_container(&self) -> bool {
        self.inner.is_container
    }

    /// Whether the owning object lives in a directory service
    #[must_use]
    pub fn is_ds(&self) -> bool {
        self.inner.is_ds
    }

    /// The ACL revision byte
    #[must_use]
    pub fn revision(&self) -> u8 {
        self.inner.raw.revision()
    }

    /// Number of entries
    #[must_use]
    pub fn count(&self) -> usize {
        self.inner.raw.count()
    }

    /// A defensive copy of the entry at `index`
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `index` is past the end
    pub fn get(&self, index: usize) -> Result<Ace> {
        self.inner.raw.get(index)
    }

    /// Length in bytes of the binary representation
    #[must_use]
    pub fn binary_length(&self) -> usize {
        self.inner.raw.binary_length()
    }

    /// Serialize into the MS-DTYP ACL wire format
    ///
    /// # Errors
    /// Returns an error if the ACL exceeds the wire format's 16-bit limits
    pub fn get_binary_form(&self) -> Result<Vec<u8>> {
        self.inner.raw.get_binary_form()
    }

    /// Append an audit entry; never removes anything
    #[allow(clippy::too_many_arguments)]
    pub fn add_audit(
        &mut self,
        audit_flags: AuditFlags,
        sid: &SecurityIdentifier,
        access_mask: u32,
        inheritance_flags: InheritanceFlags,
        propagation_flags: PropagationFlags,
        object_flags: ObjectAceFlags,
        object_type: Guid,
        inherited_object_type: Guid,
    ) {
        self.inner.add(
            AceQualifier::SystemAudit,
            ace_header_flags(inheritance_flags, propagation_flags, audit_flags),
            sid,
            access_mask,
            object_flags,
            object_type,
            inherited_object_type,
        );
    }

    /// Supersede every explicit audit entry for the identity with the single new entry
    #[allow(clippy::too_many_arguments)]
    pub fn set_audit(
        &mut self,
        audit_flags: AuditFlags,
        sid: &SecurityIdentifier,
        access_mask: u32,
        inheritance_flags: InheritanceFlags,
        propagation_flags: PropagationFlags,
        object_flags: ObjectAceFlags,
        object_type: Guid,
        inherited_object_type: Guid,
    ) {
        self.inner.set(
            AceQualifier::SystemAudit,
            ace_header_flags(inheritance_flags, propagation_flags, audit_flags),
            sid,
            access_mask,
            object_flags,
            object_type,
            inherited_object_type,
        );
    }

    /// Remove audit entries for the identity
    ///
    /// With [`ACCESS_MASK_ALL`] as the mask, purges every explicit audit entry for the
    /// identity and always returns `true`; otherwise removes entries matching the full
    /// tuple (audit conditions included) and returns whether anything was removed.
    #[allow(clippy::too_many_arguments)]
    pub fn remove_audit(
        &mut self,
        audit_flags: AuditFlags,
        sid: &SecurityIdentifier,
        access_mask: u32,
        inheritance_flags: InheritanceFlags,
        propagation_flags: PropagationFlags,
        object_flags: ObjectAceFlags,
        object_type: Guid,
        inherited_object_type: Guid,
    ) -> bool {
        self.inner.remove(
            AceQualifier::SystemAudit,
            ace_header_flags(inheritance_flags, propagation_flags, audit_flags),
            sid,
            access_mask,
            object_flags,
            object_type,
            inherited_object_type,
        )
    }

    /// Remove audit entries matching the full tuple, without reporting a result
    #[allow(clippy::too_many_arguments)]
    pub fn remove_audit_specific(
        &mut self,
        audit_flags: AuditFlags,
        sid: &SecurityIdentifier,
        access_mask: u32,
        inheritance_flags: InheritanceFlags,
        propagation_flags: PropagationFlags,
        object_flags: ObjectAceFlags,
        object_type: Guid,
        inherited_object_type: Guid,
    ) {
        self.inner.remove(
            AceQualifier::SystemAudit,
            ace_header_flags(inheritance_flags, propagation_flags, audit_flags),
            sid,
            access_mask,
            object_flags,
            object_type,
            inherited_object_type,
        );
    }
}

fn qualifier_for(access_type: AccessControlType) -> AceQualifier {
    match access_type {
        AccessControlType::Allow => AceQualifier::AccessAllowed,
        AccessControlType::Deny => AceQualifier::AccessDenied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::{ACL_REVISION, ACL_REVISION_DS};

    fn world() -> SecurityIdentifier {
        SecurityIdentifier::world()
    }

    fn system() -> SecurityIdentifier {
        SecurityIdentifier::local_system()
    }

    fn add_allow(dacl: &mut DiscretionaryAcl, sid: &SecurityIdentifier, mask: u32) {
        dacl.add_access(
            AccessControlType::Allow,
            sid,
            mask,
            InheritanceFlags::empty(),
            PropagationFlags::empty(),
            ObjectAceFlags::empty(),
            Guid::ZERO,
            Guid::ZERO,
        );
    }

    #[test]
    fn add_appends_in_order() {
        let mut dacl = DiscretionaryAcl::new(true, true, ACL_REVISION_DS);
        add_allow(&mut dacl, &world(), 1);
        add_allow(&mut dacl, &system(), 2);
        add_allow(&mut dacl, &world(), 3);

        assert_eq!(dacl.count(), 3);
        assert_eq!(dacl.get(0).unwrap().access_mask(), 1);
        assert_eq!(dacl.get(1).unwrap().access_mask(), 2);
        assert_eq!(dacl.get(2).unwrap().access_mask(), 3);
    }

    #[test]
    fn set_supersedes_same_identity_same_qualifier() {
        let mut dacl = DiscretionaryAcl::new(true, true, ACL_REVISION_DS);
        add_allow(&mut dacl, &world(), 1);
        add_allow(&mut dacl, &world(), 2);
        add_allow(&mut dacl, &system(), 4);

        dacl.set_access(
            AccessControlType::Allow,
            &world(),
            8,
            InheritanceFlags::empty(),
            PropagationFlags::empty(),
            ObjectAceFlags::empty(),
            Guid::ZERO,
            Guid::ZERO,
        );

        assert_eq!(dacl.count(), 2);
        assert_eq!(dacl.get(0).unwrap().access_mask(), 4);
        assert_eq!(dacl.get(1).unwrap().access_mask(), 8);
        assert_eq!(*dacl.get(1).unwrap().security_identifier(), world());
    }

    #[test]
    fn set_leaves_opposite_qualifier_alone() {
        let mut dacl = DiscretionaryAcl::new(true, true, ACL_REVISION_DS);
        dacl.add_access(
            AccessControlType::Deny,
            &world(),
            1,
            InheritanceFlags::empty(),
            PropagationFlags::empty(),
            ObjectAceFlags::empty(),
            Guid::ZERO,
            Guid::ZERO,
        );

        dacl.set_access(
            AccessControlType::Allow,
            &world(),
            2,
            InheritanceFlags::empty(),
            PropagationFlags::empty(),
            ObjectAceFlags::empty(),
            Guid::ZERO,
            Guid::ZERO,
        );

        assert_eq!(dacl.count(), 2);
        assert_eq!(
            dacl.get(0).unwrap().qualifier(),
            Some(AceQualifier::AccessDenied)
        );
    }

    #[test]
    fn remove_exact_tuple_only() {
        let mut dacl = DiscretionaryAcl::new(true, true, ACL_REVISION_DS);
        add_allow(&mut dacl, &world(), 0x30);

        // different mask, nothing removed
        assert!(!dacl.remove_access(
            AccessControlType::Allow,
            &world(),
            0x10,
            InheritanceFlags::empty(),
            PropagationFlags::empty(),
            ObjectAceFlags::empty(),
            Guid::ZERO,
            Guid::ZERO,
        ));
        assert_eq!(dacl.count(), 1);

        // different inheritance flags, nothing removed
        assert!(!dacl.remove_access(
            AccessControlType::Allow,
            &world(),
            0x30,
            InheritanceFlags::CONTAINER_INHERIT,
            PropagationFlags::empty(),
            ObjectAceFlags::empty(),
            Guid::ZERO,
            Guid::ZERO,
        ));
        assert_eq!(dacl.count(), 1);

        // exact tuple, removed
        assert!(dacl.remove_access(
            AccessControlType::Allow,
            &world(),
            0x30,
            InheritanceFlags::empty(),
            PropagationFlags::empty(),
            ObjectAceFlags::empty(),
            Guid::ZERO,
            Guid::ZERO,
        ));
        assert_eq!(dacl.count(), 0);
    }

    #[test]
    fn purge_strikes_every_entry_for_identity() {
        let mut dacl = DiscretionaryAcl::new(true, true, ACL_REVISION_DS);
        add_allow(&mut dacl, &world(), 1);
        add_allow(&mut dacl, &world(), 2);
        add_allow(&mut dacl, &system(), 4);

        // purge succeeds even when flag arguments do not match any entry
        assert!(dacl.remove_access(
            AccessControlType::Allow,
            &world(),
            ACCESS_MASK_ALL,
            InheritanceFlags::CONTAINER_INHERIT,
            PropagationFlags::empty(),
            ObjectAceFlags::empty(),
            Guid::ZERO,
            Guid::ZERO,
        ));
        assert_eq!(dacl.count(), 1);
        assert_eq!(*dacl.get(0).unwrap().security_identifier(), system());

        // purging an identity with no entries still succeeds
        assert!(dacl.remove_access(
            AccessControlType::Allow,
            &world(),
            ACCESS_MASK_ALL,
            InheritanceFlags::empty(),
            PropagationFlags::empty(),
            ObjectAceFlags::empty(),
            Guid::ZERO,
            Guid::ZERO,
        ));
    }

    #[test]
    fn inherited_entries_are_untouchable() {
        let mut raw = RawAcl::new(ACL_REVISION);
        raw.push(Ace::qualified(
            AceQualifier::AccessAllowed,
            AceFlags::INHERITED,
            0x20,
            world(),
            ObjectAceFlags::empty(),
            Guid::ZERO,
            Guid::ZERO,
        ));
        let mut dacl = DiscretionaryAcl::from_raw(true, true, raw);

        dacl.set_access(
            AccessControlType::Allow,
            &world(),
            0x40,
            InheritanceFlags::empty(),
            PropagationFlags::empty(),
            ObjectAceFlags::empty(),
            Guid::ZERO,
            Guid::ZERO,
        );
        assert_eq!(dacl.count(), 2);

        assert!(dacl.remove_access(
            AccessControlType::Allow,
            &world(),
            ACCESS_MASK_ALL,
            InheritanceFlags::empty(),
            PropagationFlags::empty(),
            ObjectAceFlags::empty(),
            Guid::ZERO,
            Guid::ZERO,
        ));

        // only the explicit entry was purged
        assert_eq!(dacl.count(), 1);
        assert!(dacl.get(0).unwrap().is_inherited());
    }

    #[test]
    fn audit_set_replaces_regardless_of_conditions() {
        let mut sacl = SystemAcl::new(true, true, ACL_REVISION_DS);
        sacl.add_audit(
            AuditFlags::SUCCESS,
            &world(),
            0x10,
            InheritanceFlags::empty(),
            PropagationFlags::empty(),
            ObjectAceFlags::empty(),
            Guid::ZERO,
            Guid::ZERO,
        );
        sacl.add_audit(
            AuditFlags::FAILURE,
            &world(),
            0x20,
            InheritanceFlags::empty(),
            PropagationFlags::empty(),
            ObjectAceFlags::empty(),
            Guid::ZERO,
            Guid::ZERO,
        );

        sacl.set_audit(
            AuditFlags::SUCCESS | AuditFlags::FAILURE,
            &world(),
            0x40,
            InheritanceFlags::empty(),
            PropagationFlags::empty(),
            ObjectAceFlags::empty(),
            Guid::ZERO,
            Guid::ZERO,
        );

        assert_eq!(sacl.count(), 1);
        let ace = sacl.get(0).unwrap();
        assert_eq!(ace.access_mask(), 0x40);
        assert_eq!(ace.audit_flags(), AuditFlags::SUCCESS | AuditFlags::FAILURE);
    }

    #[test]
    fn audit_remove_matches_conditions() {
        let mut sacl = SystemAcl::new(true, true, ACL_REVISION_DS);
        sacl.add_audit(
            AuditFlags::SUCCESS,
            &world(),
            0x10,
            InheritanceFlags::empty(),
            PropagationFlags::empty(),
            ObjectAceFlags::empty(),
            Guid::ZERO,
            Guid::ZERO,
        );

        // same tuple but different audit conditions does not match
        assert!(!sacl.remove_audit(
            AuditFlags::FAILURE,
            &world(),
            0x10,
            InheritanceFlags::empty(),
            PropagationFlags::empty(),
            ObjectAceFlags::empty(),
            Guid::ZERO,
            Guid::ZERO,
        ));

        assert!(sacl.remove_audit(
            AuditFlags::SUCCESS,
            &world(),
            0x10,
            InheritanceFlags::empty(),
            PropagationFlags::empty(),
            ObjectAceFlags::empty(),
            Guid::ZERO,
            Guid::ZERO,
        ));
        assert_eq!(sacl.count(), 0);
    }
}
