//! Security identifier (SID) representation and binary codec.
//!
//! Provides the [`SecurityIdentifier`] value type, the canonical identity representation
//! stored inside access-control entries. Supports the MS-DTYP 2.4.2 binary layout and the
//! familiar `S-1-...` string notation in both directions.
//!
//! # Reference
//! - [MS-DTYP 2.4.2 - SID](https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-dtyp/78eb9013-1c3a-4970-ad1f-2b1dad588a25)

use std::fmt;
use std::str::FromStr;

use crate::{Error::OutOfBounds, Result};

/// The one and only SID revision defined by the specification
pub const SID_REVISION: u8 = 1;

/// Maximum number of subauthorities a SID may carry
pub const SID_MAX_SUB_AUTHORITIES: usize = 15;

/// A security identifier - the canonical, variable-length principal identity.
///
/// A SID is composed of a revision (always 1), a 48-bit identifier authority and up to
/// fifteen 32-bit subauthorities. SIDs are the identity form every ACE stores on the wire;
/// other identity kinds must be translated to a SID before they can participate in an ACL.
///
/// # Examples
///
/// ```rust
/// use aclscope::identity::SecurityIdentifier;
///
/// let sid: SecurityIdentifier = "S-1-5-21-1004336348-1177238915-682003330-512".parse()?;
/// assert_eq!(sid.sub_authority_count(), 5);
/// assert_eq!(sid.to_string(), "S-1-5-21-1004336348-1177238915-682003330-512");
/// # Ok::<(), aclscope::Error>(())
/// ```
///
/// ## Reference
/// * [MS-DTYP 2.4.2.2 - SID packet representation](https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-dtyp/f992ad60-0fe4-4b87-9fed-beb478836861)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecurityIdentifier {
    /// Revision of the SID layout, always [`SID_REVISION`]
    revision: u8,
    /// The 48-bit identifier authority, stored big-endian on the wire
    identifier_authority: u64,
    /// Up to [`SID_MAX_SUB_AUTHORITIES`] little-endian subauthority values
    sub_authorities: Vec<u32>,
}

impl SecurityIdentifier {
    /// Create a new SID from an identifier authority and its subauthorities
    ///
    /// # Arguments
    /// * `identifier_authority` - The 48-bit authority value (e.g. 5 for NT AUTHORITY)
    /// * `sub_authorities` - The subauthority chain, at most [`SID_MAX_SUB_AUTHORITIES`] entries
    ///
    /// # Errors
    /// Returns an error if the authority exceeds 48 bits or too many subauthorities are given
    pub fn new(identifier_authority: u64, sub_authorities: &[u32]) -> Result<Self> {
        if identifier_authority > 0xFFFF_FFFF_FFFF {
            return Err(malformed_error!(
                "SID identifier authority 0x{:X} exceeds 48 bits",
                identifier_authority
            ));
        }

        if sub_authorities.len() > SID_MAX_SUB_AUTHORITIES {
            return Err(malformed_error!(
                "SID cannot carry {} subauthorities (maximum is {})",
                sub_authorities.len(),
                SID_MAX_SUB_AUTHORITIES
            ));
        }

        Ok(SecurityIdentifier {
            revision: SID_REVISION,
            identifier_authority,
            sub_authorities: sub_authorities.to_vec(),
        })
    }

    /// Parse a SID from the start of a binary buffer
    ///
    /// Trailing bytes beyond the SID's own length are ignored, which allows callers to
    /// parse a SID embedded in a larger structure and advance by [`Self::binary_length`].
    ///
    /// # Arguments
    /// * `data` - Buffer beginning with an MS-DTYP 2.4.2.2 SID
    ///
    /// # Errors
    /// Returns an error if the buffer is too small or the revision / subauthority count is invalid
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < 8 {
            return Err(OutOfBounds);
        }

        let revision = data[0];
        if revision != SID_REVISION {
            return Err(malformed_error!("Unknown SID revision {}", revision));
        }

        let count = data[1] as usize;
        if count > SID_MAX_SUB_AUTHORITIES {
            return Err(malformed_error!(
                "SID subauthority count {} exceeds the maximum of {}",
                count,
                SID_MAX_SUB_AUTHORITIES
            ));
        }

        if data.len() < 8 + count * 4 {
            return Err(OutOfBounds);
        }

        // 48-bit authority, big-endian
        let mut identifier_authority = 0u64;
        for byte in &data[2..8] {
            identifier_authority = (identifier_authority << 8) | u64::from(*byte);
        }

        let mut sub_authorities = Vec::with_capacity(count);
        for i in 0..count {
            let offset = 8 + i * 4;
            sub_authorities.push(u32::from_le_bytes([
                data[offset],
                data[offset + 1],
                data[offset + 2],
                data[offset + 3],
            ]));
        }

        Ok(SecurityIdentifier {
            revision,
            identifier_authority,
            sub_authorities,
        })
    }

    /// The revision octet, always [`SID_REVISION`]
    #[must_use]
    pub fn revision(&self) -> u8 {
        self.revision
    }

    /// The 48-bit identifier authority
    #[must_use]
    pub fn identifier_authority(&self) -> u64 {
        self.identifier_authority
    }

    /// The subauthority chain
    #[must_use]
    pub fn sub_authorities(&self) -> &[u32] {
        &self.sub_authorities
    }

    /// Number of subauthorities in this SID
    #[must_use]
    pub fn sub_authority_count(&self) -> usize {
        self.sub_authorities.len()
    }

    /// Length in bytes of the binary representation
    #[must_use]
    pub fn binary_length(&self) -> usize {
        8 + self.sub_authorities.len() * 4
    }

    /// Serialize this SID into its binary representation
    #[must_use]
    pub fn get_binary_form(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(self.binary_length());
        self.write_to(&mut buffer);
        buffer
    }

    /// Append the binary representation to `buffer`
    pub(crate) fn write_to(&self, buffer: &mut Vec<u8>) {
        buffer.push(self.revision);
        buffer.push(self.sub_authorities.len() as u8);
        buffer.extend_from_slice(&self.identifier_authority.to_be_bytes()[2..8]);
        for sub in &self.sub_authorities {
            buffer.extend_from_slice(&sub.to_le_bytes());
        }
    }

    /// The NULL SID, `S-1-0-0`
    #[must_use]
    pub fn null() -> Self {
        SecurityIdentifier {
            revision: SID_REVISION,
            identifier_authority: 0,
            sub_authorities: vec![0],
        }
    }

    /// The Everyone (World) SID, `S-1-1-0`
    #[must_use]
    pub fn world() -> Self {
        SecurityIdentifier {
            revision: SID_REVISION,
            identifier_authority: 1,
            sub_authorities: vec![0],
        }
    }

    /// The LOCAL SYSTEM SID, `S-1-5-18`
    #[must_use]
    pub fn local_system() -> Self {
        SecurityIdentifier {
            revision: SID_REVISION,
            identifier_authority: 5,
            sub_authorities: vec![18],
        }
    }

    /// The BUILTIN\Administrators SID, `S-1-5-32-544`
    #[must_use]
    pub fn builtin_administrators() -> Self {
        SecurityIdentifier {
            revision: SID_REVISION,
            identifier_authority: 5,
            sub_authorities: vec![32, 544],
        }
    }
}

impl fmt::Display for SecurityIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.revision)?;

        // Authorities below 2^32 print in decimal, larger ones in hexadecimal
        if self.identifier_authority < 0x1_0000_0000 {
            write!(f, "-{}", self.identifier_authority)?;
        } else {
            write!(f, "-0x{:012X}", self.identifier_authority)?;
        }

        for sub in &self.sub_authorities {
            write!(f, "-{}", sub)?;
        }

        Ok(())
    }
}

impl FromStr for SecurityIdentifier {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || crate::Error::InvalidSidString(s.to_string());

        let rest = s
            .strip_prefix("S-")
            .or_else(|| s.strip_prefix("s-"))
            .ok_or_else(invalid)?;

        let mut parts = rest.split('-');

        let revision: u8 = parts.next().ok_or_else(invalid)?.parse().map_err(|_| invalid())?;
        if revision != SID_REVISION {
            return Err(invalid());
        }

        let authority_text = parts.next().ok_or_else(invalid)?;
        let identifier_authority = if let Some(hex) = authority_text
            .strip_prefix("0x")
            .or_else(|| authority_text.strip_prefix("0X"))
        {
            u64::from_str_radix(hex, 16).map_err(|_| invalid())?
        } else {
            authority_text.parse::<u64>().map_err(|_| invalid())?
        };

        if identifier_authority > 0xFFFF_FFFF_FFFF {
            return Err(invalid());
        }

        let mut sub_authorities = Vec::new();
        for part in parts {
            if sub_authorities.len() == SID_MAX_SUB_AUTHORITIES {
                return Err(invalid());
            }
            sub_authorities.push(part.parse::<u32>().map_err(|_| invalid())?);
        }

        Ok(SecurityIdentifier {
            revision,
            identifier_authority,
            sub_authorities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_roundtrip() {
        let text = "S-1-5-21-1004336348-1177238915-682003330-512";
        let sid: SecurityIdentifier = text.parse().unwrap();

        assert_eq!(sid.revision(), 1);
        assert_eq!(sid.identifier_authority(), 5);
        assert_eq!(sid.sub_authority_count(), 5);
        assert_eq!(sid.to_string(), text);
    }

    #[test]
    fn binary_roundtrip() {
        let sid = SecurityIdentifier::new(5, &[21, 1004336348, 1177238915, 682003330, 512]).unwrap();
        let bytes = sid.get_binary_form();

        assert_eq!(bytes.len(), sid.binary_length());
        assert_eq!(bytes[0], SID_REVISION);
        assert_eq!(bytes[1], 5);

        let parsed = SecurityIdentifier::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, sid);
    }

    #[test]
    fn crafted_world_sid_bytes() {
        // S-1-1-0
        let data = [0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00];
        let sid = SecurityIdentifier::from_bytes(&data).unwrap();
        assert_eq!(sid, SecurityIdentifier::world());
    }

    #[test]
    fn large_authority_prints_hex() {
        let sid = SecurityIdentifier::new(0x1234_5678_9ABC, &[1]).unwrap();
        assert_eq!(sid.to_string(), "S-1-0x123456789ABC-1");
        assert_eq!(sid.to_string().parse::<SecurityIdentifier>().unwrap(), sid);
    }

    #[test]
    fn rejects_invalid_strings() {
        assert!("".parse::<SecurityIdentifier>().is_err());
        assert!("S-2-5-18".parse::<SecurityIdentifier>().is_err());
        assert!("S-1-banana".parse::<SecurityIdentifier>().is_err());
        assert!("X-1-5-18".parse::<SecurityIdentifier>().is_err());
    }

    #[test]
    fn rejects_oversized_sids() {
        let subs = [0u32; 16];
        assert!(SecurityIdentifier::new(5, &subs).is_err());

        let mut data = vec![0x01, 16, 0, 0, 0, 0, 0, 5];
        data.extend_from_slice(&[0u8; 64]);
        assert!(SecurityIdentifier::from_bytes(&data).is_err());
    }

    #[test]
    fn truncated_buffer_is_out_of_bounds() {
        let sid = SecurityIdentifier::local_system();
        let bytes = sid.get_binary_form();
        assert!(SecurityIdentifier::from_bytes(&bytes[..bytes.len() - 1]).is_err());
    }
}
