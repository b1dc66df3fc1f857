//! The access-control entry (ACE) object model and binary codec.
//!
//! One [`Ace`] is one record in an ACL: a qualifier (allow / deny / audit), a principal, an
//! access mask, header flags describing inheritance and audit conditions, and - for the
//! object variants - a GUID pair scoping the entry to a sub-object type. Callback variants
//! additionally carry opaque conditional-expression bytes which are preserved verbatim.
//!
//! Binary layout (MS-DTYP 2.4.4, all integers little-endian):
//!
//! ```text
//! +------+-------+--------+------+--------------------------------------+
//! | type | flags |  size  | mask | [objflags] [guid] [guid] sid [data]  |
//! +------+-------+--------+------+--------------------------------------+
//!   u8     u8      u16      u32    object variants only
//! ```
//!
//! # Reference
//! - [MS-DTYP 2.4.4 - ACE](https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-dtyp/d06e5a81-176e-46c6-9cf7-9137aad4455e)

use uguid::Guid;

use crate::{
    acl::{AceFlags, AceQualifier, AceType, ObjectAceFlags},
    identity::SecurityIdentifier,
    rules::{AuditFlags, InheritanceFlags, PropagationFlags},
    Error::OutOfBounds,
    Result,
};

/// ACE header length: type, flags, and the 16-bit size field
const ACE_HEADER_LENGTH: usize = 4;

/// One access-control entry.
///
/// An `Ace` is a self-contained value: indexed reads from an ACL hand out defensive
/// copies, so holding an `Ace` never aliases live ACL storage. Mutation code constructs
/// entries through the ACL layer; parsers construct them from binary form.
///
/// # Examples
///
/// ```rust
/// use aclscope::acl::{Ace, AceQualifier};
///
/// # let bytes = [0x00u8, 0x00, 0x14, 0x00, 0xFF, 0x01, 0x1F, 0x00,
/// #               0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00];
/// let ace = Ace::from_bytes(&bytes)?;
/// assert_eq!(ace.qualifier(), Some(AceQualifier::AccessAllowed));
/// assert_eq!(ace.access_mask(), 0x1F01FF);
/// # Ok::<(), aclscope::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ace {
    ace_type: AceType,
    flags: AceFlags,
    access_mask: u32,
    sid: SecurityIdentifier,
    object_flags: ObjectAceFlags,
    object_type: Guid,
    inherited_object_type: Guid,
    application_data: Vec<u8>,
}

impl Ace {
    /// Build a non-callback qualified ACE.
    ///
    /// The concrete type octet follows from the qualifier and from whether any object
    /// flag is set; GUIDs without their presence bit are stored as zero. Callback
    /// entries cannot be built this way - they only enter an ACL through its binary
    /// form.
    #[must_use]
    pub fn qualified(
        qualifier: AceQualifier,
        flags: AceFlags,
        access_mask: u32,
        sid: SecurityIdentifier,
        object_flags: ObjectAceFlags,
        object_type: Guid,
        inherited_object_type: Guid,
    ) -> Ace {
        Ace {
            ace_type: AceType::for_qualifier(qualifier, !object_flags.is_empty()),
            flags,
            access_mask,
            sid,
            object_flags,
            object_type: if object_flags.contains(ObjectAceFlags::OBJECT_TYPE_PRESENT) {
                object_type
            } else {
                Guid::ZERO
            },
            inherited_object_type: if object_flags
                .contains(ObjectAceFlags::INHERITED_OBJECT_TYPE_PRESENT)
            {
                inherited_object_type
            } else {
                Guid::ZERO
            },
            application_data: Vec::new(),
        }
    }

    /// Parse one ACE from the start of `data`
    ///
    /// Bytes beyond the length declared in the ACE header are ignored, which allows a
    /// caller to parse a whole ACL by advancing [`Self::binary_length`] at a time.
    ///
    /// # Arguments
    /// * `data` - Buffer beginning with an ACE header
    ///
    /// # Errors
    /// Returns an error for truncated buffers, unknown type octets, unknown object flag
    /// bits, or the unsupported compound layout
    pub fn from_bytes(data: &[u8]) -> Result<Ace> {
        if data.len() < ACE_HEADER_LENGTH {
            return Err(OutOfBounds);
        }

        let Some(ace_type) = AceType::from_repr(data[0]) else {
            return Err(malformed_error!("Unknown ACE type octet 0x{:02X}", data[0]));
        };

        if ace_type == AceType::AccessAllowedCompound {
            return Err(crate::Error::NotSupported);
        }

        let Some(flags) = AceFlags::from_bits(data[1]) else {
            return Err(malformed_error!("Unknown ACE flag bits 0x{:02X}", data[1]));
        };

        let size = u16::from_le_bytes([data[2], data[3]]) as usize;
        if size < ACE_HEADER_LENGTH + 4 || size > data.len() {
            return Err(OutOfBounds);
        }

        let body = &data[..size];
        let mut offset = ACE_HEADER_LENGTH;

        let access_mask = u32::from_le_bytes([
            body[offset],
            body[offset + 1],
            body[offset + 2],
            body[offset + 3],
        ]);
        offset += 4;

        let mut object_flags = ObjectAceFlags::empty();
        let mut object_type = Guid::ZERO;
        let mut inherited_object_type = Guid::ZERO;

        if ace_type.is_object_variant() {
            if body.len() < offset + 4 {
                return Err(OutOfBounds);
            }

            let raw_flags = u32::from_le_bytes([
                body[offset],
                body[offset + 1],
                body[offset + 2],
                body[offset + 3],
            ]);
            offset += 4;

            object_flags = ObjectAceFlags::from_bits(raw_flags).ok_or_else(|| {
                malformed_error!("Unknown object ACE flag bits 0x{:08X}", raw_flags)
            })?;

            if object_flags.contains(ObjectAceFlags::OBJECT_TYPE_PRESENT) {
                object_type = read_guid(body, &mut offset)?;
            }
            if object_flags.contains(ObjectAceFlags::INHERITED_OBJECT_TYPE_PRESENT) {
                inherited_object_type = read_guid(body, &mut offset)?;
            }
        }

        let sid = SecurityIdentifier::from_bytes(&body[offset..])?;
        offset += sid.binary_length();

        if offset > body.len() {
            return Err(OutOfBounds);
        }

        Ok(Ace {
            ace_type,
            flags,
            access_mask,
            sid,
            object_flags,
            object_type,
            inherited_object_type,
            application_data: body[offset..].to_vec(),
        })
    }

    /// Length in bytes of the binary representation
    #[must_use]
    pub fn binary_length(&self) -> usize {
        let mut length = ACE_HEADER_LENGTH + 4;

        if self.ace_type.is_object_variant() {
            length += 4;
            if self.object_flags.contains(ObjectAceFlags::OBJECT_TYPE_PRESENT) {
                length += 16;
            }
            if self
                .object_flags
                .contains(ObjectAceFlags::INHERITED_OBJECT_TYPE_PRESENT)
            {
                length += 16;
            }
        }

        length + self.sid.binary_length() + self.application_data.len()
    }

    /// Append the binary representation to `buffer`
    pub(crate) fn write_to(&self, buffer: &mut Vec<u8>) {
        buffer.push(self.ace_type as u8);
        buffer.push(self.flags.bits());
        buffer.extend_from_slice(&(self.binary_length() as u16).to_le_bytes());
        buffer.extend_from_slice(&self.access_mask.to_le_bytes());

        if self.ace_type.is_object_variant() {
            buffer.extend_from_slice(&self.object_flags.bits().to_le_bytes());
            if self.object_flags.contains(ObjectAceFlags::OBJECT_TYPE_PRESENT) {
                buffer.extend_from_slice(&self.object_type.to_bytes());
            }
            if self
                .object_flags
                .contains(ObjectAceFlags::INHERITED_OBJECT_TYPE_PRESENT)
            {
                buffer.extend_from_slice(&self.inherited_object_type.to_bytes());
            }
        }

        self.sid.write_to(buffer);
        buffer.extend_from_slice(&self.application_data);
    }

    /// Serialize this ACE into its binary representation
    #[must_use]
    pub fn get_binary_form(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(self.binary_length());
        self.write_to(&mut buffer);
        buffer
    }

    /// The type octet of this entry
    #[must_use]
    pub fn ace_type(&self) -> AceType {
        self.ace_type
    }

    /// The raw header flag octet
    #[must_use]
    pub fn flags(&self) -> AceFlags {
        self.flags
    }

    /// The access mask of this entry
    #[must_use]
    pub fn access_mask(&self) -> u32 {
        self.access_mask
    }

    /// The principal this entry applies to
    #[must_use]
    pub fn security_identifier(&self) -> &SecurityIdentifier {
        &self.sid
    }

    /// The qualifier of this entry, if it has one
    #[must_use]
    pub fn qualifier(&self) -> Option<AceQualifier> {
        self.ace_type.qualifier()
    }

    /// Whether this entry carries conditional-expression data
    #[must_use]
    pub fn is_callback(&self) -> bool {
        self.ace_type.is_callback_variant()
    }

    /// Whether this entry uses the object layout
    #[must_use]
    pub fn is_object_ace(&self) -> bool {
        self.ace_type.is_object_variant()
    }

    /// Whether this entry was inherited from a parent container
    #[must_use]
    pub fn is_inherited(&self) -> bool {
        self.flags.contains(AceFlags::INHERITED)
    }

    /// The inheritance behavior encoded in the header flags
    #[must_use]
    pub fn inheritance_flags(&self) -> InheritanceFlags {
        let mut inheritance = InheritanceFlags::empty();
        if self.flags.contains(AceFlags::CONTAINER_INHERIT) {
            inheritance |= InheritanceFlags::CONTAINER_INHERIT;
        }
        if self.flags.contains(AceFlags::OBJECT_INHERIT) {
            inheritance |= InheritanceFlags::OBJECT_INHERIT;
        }
        inheritance
    }

    /// The propagation behavior encoded in the header flags
    #[must_use]
    pub fn propagation_flags(&self) -> PropagationFlags {
        let mut propagation = PropagationFlags::empty();
        if self.flags.contains(AceFlags::NO_PROPAGATE_INHERIT) {
            propagation |= PropagationFlags::NO_PROPAGATE_INHERIT;
        }
        if self.flags.contains(AceFlags::INHERIT_ONLY) {
            propagation |= PropagationFlags::INHERIT_ONLY;
        }
        propagation
    }

    /// The audit conditions encoded in the header flags
    #[must_use]
    pub fn audit_flags(&self) -> AuditFlags {
        self.flags.audit_flags()
    }

    /// Presence flags of the GUID pair; empty for non-object entries
    #[must_use]
    pub fn object_flags(&self) -> ObjectAceFlags {
        self.object_flags
    }

    /// The object-type GUID, or zero when absent
    #[must_use]
    pub fn object_type(&self) -> Guid {
        self.object_type
    }

    /// The inherited-object-type GUID, or zero when absent
    #[must_use]
    pub fn inherited_object_type(&self) -> Guid {
        self.inherited_object_type
    }

    /// The opaque conditional-expression bytes of callback entries
    #[must_use]
    pub fn application_data(&self) -> &[u8] {
        &self.application_data
    }
}

fn read_guid(data: &[u8], offset: &mut usize) -> Result<Guid> {
    if data.len() < *offset + 16 {
        return Err(OutOfBounds);
    }

    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&data[*offset..*offset + 16]);
    *offset += 16;

    Ok(Guid::from_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uguid::guid;

    fn world() -> SecurityIdentifier {
        SecurityIdentifier::world()
    }

    #[test]
    fn plain_ace_roundtrip() {
        let ace = Ace::qualified(
            AceQualifier::AccessDenied,
            AceFlags::CONTAINER_INHERIT | AceFlags::INHERITED,
            0x1F01FF,
            world(),
            ObjectAceFlags::empty(),
            Guid::ZERO,
            Guid::ZERO,
        );

        assert_eq!(ace.ace_type(), AceType::AccessDenied);
        assert!(ace.is_inherited());
        assert_eq!(ace.inheritance_flags(), InheritanceFlags::CONTAINER_INHERIT);

        let bytes = ace.get_binary_form();
        assert_eq!(bytes.len(), ace.binary_length());
        assert_eq!(bytes[2] as usize + ((bytes[3] as usize) << 8), bytes.len());

        let parsed = Ace::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, ace);
    }

    #[test]
    fn object_ace_roundtrip_with_single_guid() {
        let property_set = guid!("77b5b886-944a-11d1-aebd-0000f80367c1");

        let ace = Ace::qualified(
            AceQualifier::SystemAudit,
            AceFlags::FAILED_ACCESS,
            0x20,
            world(),
            ObjectAceFlags::OBJECT_TYPE_PRESENT,
            property_set,
            Guid::ZERO,
        );

        assert_eq!(ace.ace_type(), AceType::SystemAuditObject);
        assert_eq!(ace.audit_flags(), AuditFlags::FAILURE);

        let bytes = ace.get_binary_form();
        // header + mask + object flags + one guid + sid
        assert_eq!(bytes.len(), 4 + 4 + 4 + 16 + world().binary_length());

        let parsed = Ace::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.object_type(), property_set);
        assert_eq!(parsed.inherited_object_type(), Guid::ZERO);
        assert_eq!(parsed, ace);
    }

    #[test]
    fn object_ace_roundtrip_with_both_guids() {
        let ace = Ace::qualified(
            AceQualifier::AccessAllowed,
            AceFlags::CONTAINER_INHERIT,
            crate::acl::ds_rights::WRITE_PROP,
            world(),
            ObjectAceFlags::OBJECT_TYPE_PRESENT | ObjectAceFlags::INHERITED_OBJECT_TYPE_PRESENT,
            guid!("bf967aba-0de6-11d0-a285-00aa003049e2"),
            guid!("4828cc14-1437-45bc-9b07-ad6f015e5f28"),
        );

        let parsed = Ace::from_bytes(&ace.get_binary_form()).unwrap();
        assert_eq!(parsed, ace);
    }

    #[test]
    fn callback_classification_survives_roundtrip() {
        // Hand-built callback ACE with four bytes of conditional data
        let mut bytes = vec![
            AceType::AccessAllowedCallback as u8,
            0x00,
            0x00,
            0x00, // size patched below
            0x01,
            0x00,
            0x00,
            0x00,
        ];
        bytes.extend_from_slice(&world().get_binary_form());
        bytes.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
        let size = bytes.len() as u16;
        bytes[2..4].copy_from_slice(&size.to_le_bytes());

        let ace = Ace::from_bytes(&bytes).unwrap();
        assert!(ace.is_callback());
        assert_eq!(ace.qualifier(), Some(AceQualifier::AccessAllowed));
        assert_eq!(ace.application_data(), &[0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(ace.get_binary_form(), bytes);
    }

    #[test]
    fn compound_ace_is_unsupported() {
        let bytes = [0x04u8, 0x00, 0x08, 0x00, 0x01, 0x00, 0x00, 0x00];
        assert!(matches!(
            Ace::from_bytes(&bytes),
            Err(crate::Error::NotSupported)
        ));
    }

    #[test]
    fn truncated_ace_is_rejected() {
        let ace = Ace::qualified(
            AceQualifier::AccessAllowed,
            AceFlags::empty(),
            0x01,
            world(),
            ObjectAceFlags::empty(),
            Guid::ZERO,
            Guid::ZERO,
        );
        let bytes = ace.get_binary_form();
        assert!(Ace::from_bytes(&bytes[..bytes.len() - 2]).is_err());
    }

    #[test]
    fn unknown_type_octet_is_malformed() {
        let bytes = [0x42u8, 0x00, 0x08, 0x00, 0x01, 0x00, 0x00, 0x00];
        assert!(matches!(
            Ace::from_bytes(&bytes),
            Err(crate::Error::Malformed { .. })
        ));
    }
}
