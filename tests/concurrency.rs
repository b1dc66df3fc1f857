//! Integration tests for the container's reader/writer discipline.
//!
//! Readers take shared access only while a snapshot is built and writers take exclusive
//! access for their whole body, so any snapshot must reflect a sequence of fully-applied
//! mutations - never a half-applied one.

use std::sync::Arc;
use std::thread;

use aclscope::prelude::*;
use uguid::Guid;

fn sid_for(index: u32) -> SecurityIdentifier {
    SecurityIdentifier::new(5, &[21, 1000, 2000, index]).unwrap()
}

fn big_container(entries: u32) -> DirectoryObjectSecurity<StandardRuleFactory> {
    let mut raw = RawAcl::new(ACL_REVISION_DS);
    for index in 0..entries {
        raw.insert_ace(
            index as usize,
            Ace::qualified(
                AceQualifier::AccessAllowed,
                AceFlags::empty(),
                index + 1,
                sid_for(index),
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

fn masks_of(rules: &AuthorizationRuleCollection) -> Vec<u32> {
    rules.iter().map(AuthorizationRule::access_mask).collect()
}

#[test]
fn simultaneous_readers_return_equal_snapshots() {
    let security = big_container(10_000);

    thread::scope(|scope| {
        let first = scope.spawn(|| security.get_access_rules(true, true, IdentityKind::Sid).unwrap());
        let second =
            scope.spawn(|| security.get_access_rules(true, true, IdentityKind::Sid).unwrap());

        let first = first.join().unwrap();
        let second = second.join().unwrap();

        assert_eq!(first.len(), 10_000);
        assert_eq!(masks_of(&first), masks_of(&second));
    });
}

#[test]
fn snapshots_never_observe_a_half_applied_mutation() {
    const BASE: u32 = 10_000;
    const APPENDED: u32 = 50;

    let security = big_container(BASE);
    let expected: Vec<u32> = (1..=BASE + APPENDED).collect();

    thread::scope(|scope| {
        let writer = scope.spawn(|| {
            for index in BASE..BASE + APPENDED {
                let rule = AccessRule::new(
                    sid_for(index).into(),
                    index + 1,
                    false,
                    InheritanceFlags::empty(),
                    PropagationFlags::empty(),
                    AccessControlType::Allow,
                )
                .unwrap();
                security.add_access_rule(&rule).unwrap();
            }
        });

        for _ in 0..4 {
            scope.spawn(|| {
                loop {
                    let snapshot = security.get_access_rules(true, true, IdentityKind::Sid).unwrap();
                    let length = snapshot.len();

                    // every snapshot is a prefix of the final sequence
                    assert!(length >= BASE as usize && length <= expected.len());
                    assert_eq!(masks_of(&snapshot), &expected[..length]);

                    if length == expected.len() {
                        break;
                    }
                }
            });
        }

        writer.join().unwrap();
    });

    let last = security.get_access_rules(true, true, IdentityKind::Sid).unwrap();
    assert_eq!(masks_of(&last), expected);
}

#[test]
fn detached_snapshots_outlive_later_mutations() {
    let security = big_container(16);
    let snapshot = security.get_access_rules(true, true, IdentityKind::Sid).unwrap();

    let purge = AccessRule::new(
        sid_for(0).into(),
        0x1,
        false,
        InheritanceFlags::empty(),
        PropagationFlags::empty(),
        AccessControlType::Allow,
    )
    .unwrap();
    security.remove_access_rule_all(&purge).unwrap();

    // the old snapshot still reads the pre-mutation state
    assert_eq!(snapshot.len(), 16);
    assert_eq!(
        security.get_access_rules(true, true, IdentityKind::Sid).unwrap().len(),
        15
    );
}
