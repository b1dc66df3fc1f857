//! The security descriptor: owner, group, and the DACL / SACL pair.
//!
//! A [`SecurityDescriptor`] is the single unit of state the securable-object container
//! owns. It holds at most one discretionary ACL and at most one system ACL; either may be
//! absent, and absence (no presence control bit) is distinct from present-but-empty.
//!
//! # Architecture
//!
//! The descriptor itself is dumb state plus a binary codec. All rule semantics - when an
//! ACL is created, when its revision is upgraded, which presence flags are set - live in
//! the container; the descriptor only guarantees faithful storage and (de)serialization
//! in the self-relative MS-DTYP 2.4.6 layout:
//!
//! ```text
//! +----------+------+---------+--------------+--------------+-------------+-------------+
//! | revision | sbz1 | control | owner offset | group offset | sacl offset | dacl offset |
//! +----------+------+---------+--------------+--------------+-------------+-------------+
//!   u8         u8     u16       u32            u32            u32           u32
//! ```
//!
//! Offsets are relative to the start of the descriptor; zero means absent.
//!
//! # Key Components
//!
//! - [`SecurityDescriptor`] - the owned state with its binary codec
//! - [`ControlFlags`] - the 16-bit control word, including the two ACL presence bits
//!
//! # Reference
//! - [MS-DTYP 2.4.6 - SECURITY_DESCRIPTOR](https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-dtyp/7d4dac05-9cef-4563-a058-f108abecce1d)

use bitflags::bitflags;

use crate::{
    acl::{DiscretionaryAcl, RawAcl, SystemAcl},
    identity::SecurityIdentifier,
    Error::OutOfBounds,
    Result,
};

/// The one defined security descriptor revision
pub const SECURITY_DESCRIPTOR_REVISION: u8 = 1;

/// Length of the self-relative descriptor header
const SD_HEADER_LENGTH: usize = 20;

bitflags! {
    /// The control word of a security descriptor.
    ///
    /// The two presence bits are the authority on whether a DACL / SACL exists; the
    /// securable-object container sets them when it materializes an absent ACL and
    /// queries consult them before touching either list.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ControlFlags: u16 {
        /// The owner SID was provided by a defaulting mechanism
        const OWNER_DEFAULTED = 0x0001;
        /// The group SID was provided by a defaulting mechanism
        const GROUP_DEFAULTED = 0x0002;
        /// A discretionary ACL is present
        const DISCRETIONARY_ACL_PRESENT = 0x0004;
        /// The DACL was provided by a defaulting mechanism
        const DISCRETIONARY_ACL_DEFAULTED = 0x0008;
        /// A system ACL is present
        const SYSTEM_ACL_PRESENT = 0x0010;
        /// The SACL was provided by a defaulting mechanism
        const SYSTEM_ACL_DEFAULTED = 0x0020;
        /// The DACL was not provided by a trusted source
        const DISCRETIONARY_ACL_UNTRUSTED = 0x0040;
        /// The caller wants server-style substitution of the owner
        const SERVER_SECURITY = 0x0080;
        /// Inheritance must be recomputed for the DACL
        const DISCRETIONARY_ACL_AUTO_INHERIT_REQUIRED = 0x0100;
        /// Inheritance must be recomputed for the SACL
        const SYSTEM_ACL_AUTO_INHERIT_REQUIRED = 0x0200;
        /// The DACL supports automatic inheritance
        const DISCRETIONARY_ACL_AUTO_INHERITED = 0x0400;
        /// The SACL supports automatic inheritance
        const SYSTEM_ACL_AUTO_INHERITED = 0x0800;
        /// The DACL is protected against inherited entries
        const DISCRETIONARY_ACL_PROTECTED = 0x1000;
        /// The SACL is protected against inherited entries
        const SYSTEM_ACL_PROTECTED = 0x2000;
        /// The resource-manager control byte is valid
        const RM_CONTROL_VALID = 0x4000;
        /// The descriptor is in self-relative (contiguous) form
        const SELF_RELATIVE = 0x8000;
    }
}

/// One securable object's security descriptor.
///
/// Owner, group, control word, and the optional DACL / SACL pair. This type carries no
/// locking - the container wraps it - and no rule semantics; it stores exactly what it is
/// given and round-trips it through the self-relative binary layout.
///
/// # Examples
///
/// ```rust
/// use aclscope::descriptor::{ControlFlags, SecurityDescriptor};
///
/// let descriptor = SecurityDescriptor::new();
/// assert!(descriptor.discretionary_acl().is_none());
/// assert!(!descriptor.control_flags().contains(ControlFlags::DISCRETIONARY_ACL_PRESENT));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SecurityDescriptor {
    control: ControlFlags,
    owner: Option<SecurityIdentifier>,
    group: Option<SecurityIdentifier>,
    sacl: Option<SystemAcl>,
    dacl: Option<DiscretionaryAcl>,
}

impl SecurityDescriptor {
    /// Create an empty descriptor: no owner, no group, no ACLs
    #[must_use]
    pub fn new() -> Self {
        SecurityDescriptor {
            control: ControlFlags::empty(),
            owner: None,
            group: None,
            sacl: None,
            dacl: None,
        }
    }

    /// Parse a self-relative descriptor from binary form
    ///
    /// The container / directory-service nature of the owning object is not encoded in
    /// the descriptor itself, so the caller supplies it for the reconstructed ACLs.
    ///
    /// # Arguments
    /// * `is_container` - Whether the owning object can have children
    /// * `is_ds` - Whether the owning object lives in a directory service
    /// * `data` - Buffer holding an MS-DTYP 2.4.6 self-relative descriptor
    ///
    /// # Errors
    /// Returns an error on truncated input, an unknown revision, unknown control bits,
    /// or malformed embedded SIDs / ACLs
    pub fn from_bytes(is_container: bool, is_ds: bool, data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(crate::Error::Empty);
        }

        if data.len() < SD_HEADER_LENGTH {
            return Err(OutOfBounds);
        }

        if data[0] != SECURITY_DESCRIPTOR_REVISION {
            return Err(crate::Error::NotSupported);
        }

        let raw_control = u16::from_le_bytes([data[2], data[3]]);
        let Some(mut control) = ControlFlags::from_bits(raw_control) else {
            return Err(malformed_error!(
                "Unknown security descriptor control bits 0x{:04X}",
                raw_control
            ));
        };

        let owner_offset = read_offset(data, 4)?;
        let group_offset = read_offset(data, 8)?;
        let sacl_offset = read_offset(data, 12)?;
        let dacl_offset = read_offset(data, 16)?;

        let owner = match owner_offset {
            0 => None,
            offset => Some(SecurityIdentifier::from_bytes(&data[offset..])?),
        };
        let group = match group_offset {
            0 => None,
            offset => Some(SecurityIdentifier::from_bytes(&data[offset..])?),
        };
        let sacl = match sacl_offset {
            0 => None,
            offset => Some(SystemAcl::from_raw(
                is_container,
                is_ds,
                RawAcl::from_bytes(&data[offset..])?,
            )),
        };
        let dacl = match dacl_offset {
            0 => None,
            offset => Some(DiscretionaryAcl::from_raw(
                is_container,
                is_ds,
                RawAcl::from_bytes(&data[offset..])?,
            )),
        };

        // The parsed state is the authority; presence bits follow what was actually there
        control.set(ControlFlags::SYSTEM_ACL_PRESENT, sacl.is_some());
        control.set(ControlFlags::DISCRETIONARY_ACL_PRESENT, dacl.is_some());
        control.remove(ControlFlags::SELF_RELATIVE);

        Ok(SecurityDescriptor {
            control,
            owner,
            group,
            sacl,
            dacl,
        })
    }

    /// The control word
    #[must_use]
    pub fn control_flags(&self) -> ControlFlags {
        self.control
    }

    /// Set additional control bits, leaving the others untouched
    pub fn add_control_flags(&mut self, flags: ControlFlags) {
        self.control |= flags;
    }

    /// Clear control bits, leaving the others untouched
    pub fn remove_control_flags(&mut self, flags: ControlFlags) {
        self.control &= !flags;
    }

    /// The owner SID, if any
    #[must_use]
    pub fn owner(&self) -> Option<&SecurityIdentifier> {
        self.owner.as_ref()
    }

    /// Replace the owner SID
    pub fn set_owner(&mut self, owner: Option<SecurityIdentifier>) {
        self.owner = owner;
    }

    /// The primary group SID, if any
    #[must_use]
    pub fn group(&self) -> Option<&SecurityIdentifier> {
        self.group.as_ref()
    }

    /// Replace the primary group SID
    pub fn set_group(&mut self, group: Option<SecurityIdentifier>) {
        self.group = group;
    }

    /// The discretionary ACL, if one is stored
    #[must_use]
    pub fn discretionary_acl(&self) -> Option<&DiscretionaryAcl> {
        self.dacl.as_ref()
    }

    /// Mutable access to the discretionary ACL, if one is stored
    pub fn discretionary_acl_mut(&mut self) -> Option<&mut DiscretionaryAcl> {
        self.dacl.as_mut()
    }

    /// Replace the discretionary ACL; presence control bits are the caller's business
    pub fn set_discretionary_acl(&mut self, dacl: Option<DiscretionaryAcl>) {
        self.dacl = dacl;
    }

    /// The system ACL, if one is stored
    #[must_use]
    pub fn system_acl(&self) -> Option<&SystemAcl> {
        self.sacl.as_ref()
    }

    /// Mutable access to the system ACL, if one is stored
    pub fn system_acl_mut(&mut self) -> Option<&mut SystemAcl> {
        self.sacl.as_mut()
    }

    /// Replace the system ACL; presence control bits are the caller's business
    pub fn set_system_acl(&mut self, sacl: Option<SystemAcl>) {
        self.sacl = sacl;
    }

    /// Length in bytes of the self-relative binary representation
    #[must_use]
    pub fn binary_length(&self) -> usize {
        let mut length = SD_HEADER_LENGTH;

        if let Some(owner) = &self.owner {
            length += owner.binary_length();
        }
        if let Some(group) = &self.group {
            length += group.binary_length();
        }
        if let Some(sacl) = &self.sacl {
            length += sacl.binary_length();
        }
        if let Some(dacl) = &self.dacl {
            length += dacl.binary_length();
        }

        length
    }

    /// Serialize into the self-relative binary representation
    ///
    /// The written control word always carries [`ControlFlags::SELF_RELATIVE`] and
    /// presence bits matching the ACLs actually written.
    ///
    /// # Errors
    /// Returns an error if an embedded ACL exceeds its wire format limits
    pub fn get_binary_form(&self) -> Result<Vec<u8>> {
        let mut control = self.control | ControlFlags::SELF_RELATIVE;
        control.set(ControlFlags::SYSTEM_ACL_PRESENT, self.sacl.is_some());
        control.set(ControlFlags::DISCRETIONARY_ACL_PRESENT, self.dacl.is_some());

        let mut buffer = Vec::with_capacity(self.binary_length());
        buffer.push(SECURITY_DESCRIPTOR_REVISION);
        buffer.push(0);
        buffer.extend_from_slice(&control.bits().to_le_bytes());

        // header offsets are patched in as each section is written
        buffer.extend_from_slice(&[0u8; 16]);

        if let Some(owner) = &self.owner {
            patch_offset(&mut buffer, 4);
            owner.write_to(&mut buffer);
        }
        if let Some(group) = &self.group {
            patch_offset(&mut buffer, 8);
            group.write_to(&mut buffer);
        }
        if let Some(sacl) = &self.sacl {
            patch_offset(&mut buffer, 12);
            buffer.extend_from_slice(&sacl.get_binary_form()?);
        }
        if let Some(dacl) = &self.dacl {
            patch_offset(&mut buffer, 16);
            buffer.extend_from_slice(&dacl.get_binary_form()?);
        }

        Ok(buffer)
    }
}

fn read_offset(data: &[u8], at: usize) -> Result<usize> {
    let offset = u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]]) as usize;
    if offset != 0 && (offset < SD_HEADER_LENGTH || offset >= data.len()) {
        return Err(OutOfBounds);
    }

    Ok(offset)
}

/// Record the current buffer end as the section offset in the header slot at `at`
fn patch_offset(buffer: &mut Vec<u8>, at: usize) {
    let offset = buffer.len() as u32;
    buffer[at..at + 4].copy_from_slice(&offset.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::{ObjectAceFlags, ACL_REVISION, ACL_REVISION_DS};
    use crate::rules::{AccessControlType, AuditFlags, InheritanceFlags, PropagationFlags};
    use uguid::Guid;

    fn sample_descriptor() -> SecurityDescriptor {
        let mut descriptor = SecurityDescriptor::new();
        descriptor.set_owner(Some(SecurityIdentifier::builtin_administrators()));
        descriptor.set_group(Some(SecurityIdentifier::local_system()));

        let mut dacl = DiscretionaryAcl::new(true, true, ACL_REVISION_DS);
        dacl.add_access(
            AccessControlType::Allow,
            &SecurityIdentifier::world(),
            0x1F01FF,
            InheritanceFlags::CONTAINER_INHERIT,
            PropagationFlags::empty(),
            ObjectAceFlags::empty(),
            Guid::ZERO,
            Guid::ZERO,
        );
        descriptor.set_discretionary_acl(Some(dacl));
        descriptor.add_control_flags(ControlFlags::DISCRETIONARY_ACL_PRESENT);

        let mut sacl = SystemAcl::new(true, true, ACL_REVISION);
        sacl.add_audit(
            AuditFlags::FAILURE,
            &SecurityIdentifier::world(),
            0x20,
            InheritanceFlags::empty(),
            PropagationFlags::empty(),
            ObjectAceFlags::empty(),
            Guid::ZERO,
            Guid::ZERO,
        );
        descriptor.set_system_acl(Some(sacl));
        descriptor.add_control_flags(ControlFlags::SYSTEM_ACL_PRESENT);

        descriptor
    }

    #[test]
    fn binary_roundtrip() {
        let descriptor = sample_descriptor();
        let bytes = descriptor.get_binary_form().unwrap();

        assert_eq!(bytes.len(), descriptor.binary_length());
        assert_eq!(bytes[0], SECURITY_DESCRIPTOR_REVISION);

        let parsed = SecurityDescriptor::from_bytes(true, true, &bytes).unwrap();
        assert_eq!(parsed.owner(), descriptor.owner());
        assert_eq!(parsed.group(), descriptor.group());
        assert_eq!(parsed.discretionary_acl(), descriptor.discretionary_acl());
        assert_eq!(parsed.system_acl(), descriptor.system_acl());
    }

    #[test]
    fn written_control_word_is_self_relative() {
        let bytes = sample_descriptor().get_binary_form().unwrap();
        let control = ControlFlags::from_bits(u16::from_le_bytes([bytes[2], bytes[3]])).unwrap();

        assert!(control.contains(ControlFlags::SELF_RELATIVE));
        assert!(control.contains(ControlFlags::DISCRETIONARY_ACL_PRESENT));
        assert!(control.contains(ControlFlags::SYSTEM_ACL_PRESENT));
    }

    #[test]
    fn empty_descriptor_roundtrip() {
        let descriptor = SecurityDescriptor::new();
        let bytes = descriptor.get_binary_form().unwrap();
        assert_eq!(bytes.len(), SD_HEADER_LENGTH);

        let parsed = SecurityDescriptor::from_bytes(true, true, &bytes).unwrap();
        assert!(parsed.owner().is_none());
        assert!(parsed.discretionary_acl().is_none());
        assert!(parsed.system_acl().is_none());
    }

    #[test]
    fn unknown_revision_is_unsupported() {
        let mut bytes = SecurityDescriptor::new().get_binary_form().unwrap();
        bytes[0] = 2;
        assert!(matches!(
            SecurityDescriptor::from_bytes(true, true, &bytes),
            Err(crate::Error::NotSupported)
        ));
    }

    #[test]
    fn out_of_range_offset_is_rejected() {
        let mut bytes = SecurityDescriptor::new().get_binary_form().unwrap();
        bytes[4..8].copy_from_slice(&0xFFFF_FFF0u32.to_le_bytes());
        assert!(SecurityDescriptor::from_bytes(true, true, &bytes).is_err());
    }
}
