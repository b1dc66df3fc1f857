//! Integration tests for the legacy-to-DS ACL revision upgrade.
//!
//! Object-typed (GUID-scoped) entries require the DS ACL revision. Applying an
//! object-typed add / set / reset to a legacy-revision ACL must clone it in place -
//! every existing entry preserved - with only the revision raised.

use std::sync::Arc;

use aclscope::acl::ds_rights;
use aclscope::prelude::*;
use uguid::{guid, Guid};

fn world() -> SecurityIdentifier {
    SecurityIdentifier::world()
}

fn system() -> SecurityIdentifier {
    SecurityIdentifier::local_system()
}

fn schema_guid() -> uguid::Guid {
    guid!("bf967aba-0de6-11d0-a285-00aa003049e2")
}

fn legacy_dacl_container(
    entries: &[(SecurityIdentifier, u32)],
) -> DirectoryObjectSecurity<StandardRuleFactory> {
    let mut raw = RawAcl::new(ACL_REVISION);
    for (index, (sid, mask)) in entries.iter().enumerate() {
        raw.insert_ace(
            index,
            Ace::qualified(
                AceQualifier::AccessAllowed,
                AceFlags::CONTAINER_INHERIT,
                *mask,
                sid.clone(),
                ObjectAceFlags::empty(),
                Guid::ZERO,
                Guid::ZERO,
            ),
        )
        .unwrap();
    }

    let mut descriptor = SecurityDescriptor::new();
    descriptor.set_discretionary_acl(Some(DiscretionaryAcl::from_raw(true, true, raw)));
    descriptor.add_control_flags(ControlFlags::DISCRETIONARY_ACL_PRESENT);
    DirectoryObjectSecurity::from_descriptor(
        descriptor,
        Arc::new(AccountDirectory::new()),
        StandardRuleFactory,
    )
}

fn object_allow_rule(mask: u32) -> AccessRule {
    AccessRule::object_typed(
        world().into(),
        mask,
        false,
        InheritanceFlags::empty(),
        PropagationFlags::empty(),
        schema_guid(),
        Guid::ZERO,
        AccessControlType::Allow,
    )
    .unwrap()
}

fn dacl_of(security: &DirectoryObjectSecurity<StandardRuleFactory>) -> DiscretionaryAcl {
    let bytes = security.security_descriptor_binary_form().unwrap();
    SecurityDescriptor::from_bytes(true, true, &bytes)
        .unwrap()
        .discretionary_acl()
        .unwrap()
        .clone()
}

#[test]
fn object_typed_add_upgrades_a_legacy_dacl_in_place() {
    let security = legacy_dacl_container(&[(world(), 0x11), (system(), 0x22)]);

    security
        .add_access_rule(&object_allow_rule(ds_rights::WRITE_PROP))
        .unwrap();

    let dacl = dacl_of(&security);
    assert_eq!(dacl.revision(), ACL_REVISION_DS);
    assert_eq!(dacl.count(), 3);

    // pre-existing entries survive the upgrade byte for byte
    let first = dacl.get(0).unwrap();
    assert_eq!(*first.security_identifier(), world());
    assert_eq!(first.access_mask(), 0x11);
    assert_eq!(first.flags(), AceFlags::CONTAINER_INHERIT);

    let second = dacl.get(1).unwrap();
    assert_eq!(*second.security_identifier(), system());
    assert_eq!(second.access_mask(), 0x22);

    let added = dacl.get(2).unwrap();
    assert!(added.is_object_ace());
    assert_eq!(added.object_type(), schema_guid());
}

#[test]
fn common_rules_leave_the_legacy_revision_alone() {
    let security = legacy_dacl_container(&[(world(), 0x11)]);

    let common = AccessRule::new(
        system().into(),
        0x44,
        false,
        InheritanceFlags::empty(),
        PropagationFlags::empty(),
        AccessControlType::Allow,
    )
    .unwrap();
    security.add_access_rule(&common).unwrap();

    let dacl = dacl_of(&security);
    assert_eq!(dacl.revision(), ACL_REVISION);
    assert_eq!(dacl.count(), 2);
}

#[test]
fn object_typed_set_and_reset_also_upgrade() {
    for apply in [
        DirectoryObjectSecurity::set_access_rule
            as fn(&DirectoryObjectSecurity<StandardRuleFactory>, &AccessRule) -> aclscope::Result<()>,
        DirectoryObjectSecurity::reset_access_rule,
    ] {
        let security = legacy_dacl_container(&[(system(), 0x22)]);
        apply(&security, &object_allow_rule(ds_rights::CONTROL_ACCESS)).unwrap();

        let dacl = dacl_of(&security);
        assert_eq!(dacl.revision(), ACL_REVISION_DS);
        assert_eq!(*dacl.get(0).unwrap().security_identifier(), system());
    }
}

#[test]
fn object_typed_removal_does_not_upgrade() {
    let security = legacy_dacl_container(&[(world(), 0x11)]);

    assert!(!security
        .remove_access_rule(&object_allow_rule(ds_rights::WRITE_PROP))
        .unwrap());

    let dacl = dacl_of(&security);
    assert_eq!(dacl.revision(), ACL_REVISION);
    assert_eq!(dacl.count(), 1);
}

#[test]
fn materialized_acls_start_at_the_ds_revision() {
    let security = DirectoryObjectSecurity::new(
        Arc::new(AccountDirectory::new()),
        StandardRuleFactory,
    );

    let common = AccessRule::new(
        world().into(),
        0x1,
        false,
        InheritanceFlags::empty(),
        PropagationFlags::empty(),
        AccessControlType::Allow,
    )
    .unwrap();
    security.add_access_rule(&common).unwrap();

    assert_eq!(dacl_of(&security).revision(), ACL_REVISION_DS);
}

#[test]
fn object_typed_audit_rules_upgrade_the_sacl() {
    let mut raw = RawAcl::new(ACL_REVISION);
    raw.insert_ace(
        0,
        Ace::qualified(
            AceQualifier::SystemAudit,
            AceFlags::SUCCESSFUL_ACCESS,
            0x33,
            world(),
            ObjectAceFlags::empty(),
            Guid::ZERO,
            Guid::ZERO,
        ),
    )
    .unwrap();

    let mut descriptor = SecurityDescriptor::new();
    descriptor.set_system_acl(Some(SystemAcl::from_raw(true, true, raw)));
    descriptor.add_control_flags(ControlFlags::SYSTEM_ACL_PRESENT);
    let security = DirectoryObjectSecurity::from_descriptor(
        descriptor,
        Arc::new(AccountDirectory::new()),
        StandardRuleFactory,
    );

    let rule = AuditRule::object_typed(
        world().into(),
        ds_rights::READ_PROP,
        false,
        InheritanceFlags::empty(),
        PropagationFlags::empty(),
        schema_guid(),
        Guid::ZERO,
        AuditFlags::FAILURE,
    )
    .unwrap();
    security.add_audit_rule(&rule).unwrap();

    let bytes = security.security_descriptor_binary_form().unwrap();
    let sacl = SecurityDescriptor::from_bytes(true, true, &bytes)
        .unwrap()
        .system_acl()
        .unwrap()
        .clone();

    assert_eq!(sacl.revision(), ACL_REVISION_DS);
    assert_eq!(sacl.count(), 2);
    assert_eq!(sacl.get(0).unwrap().access_mask(), 0x33);
    assert_eq!(sacl.get(0).unwrap().audit_flags(), AuditFlags::SUCCESS);
}
