//! Identity reference and identity kind types.

use std::fmt;

use crate::identity::SecurityIdentifier;

/// The representation kinds an identity can take.
///
/// [`IdentityKind::Sid`] is the canonical kind: every identity stored inside an ACL is a
/// security identifier, and every other kind must be translatable to one. Query operations
/// accept a target kind and hand back rules whose identities have been translated in bulk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityKind {
    /// A security identifier (`S-1-...`), the canonical on-wire identity
    Sid,
    /// A human-readable account name such as `BUILTIN\Administrators`
    Account,
}

/// A reference to a principal, in one of the supported identity kinds.
///
/// Rule value objects carry an `IdentityReference`; the securable-object container
/// normalizes it to a [`SecurityIdentifier`] exactly once per mutation. The account form
/// exists so callers can work with readable names and defer SID lookup to the configured
/// identity resolver.
///
/// # Examples
///
/// ```rust
/// use aclscope::identity::{IdentityKind, IdentityReference, SecurityIdentifier};
///
/// let sid = IdentityReference::Sid(SecurityIdentifier::world());
/// assert_eq!(sid.kind(), IdentityKind::Sid);
/// assert!(sid.can_translate_to(IdentityKind::Sid));
///
/// let account = IdentityReference::Account("BUILTIN\\Users".to_string());
/// assert_eq!(account.kind(), IdentityKind::Account);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityReference {
    /// Identity given directly as a security identifier
    Sid(SecurityIdentifier),
    /// Identity given as an account name, resolved to a SID on demand
    Account(String),
}

impl IdentityReference {
    /// The kind of this reference
    #[must_use]
    pub fn kind(&self) -> IdentityKind {
        match self {
            IdentityReference::Sid(_) => IdentityKind::Sid,
            IdentityReference::Account(_) => IdentityKind::Account,
        }
    }

    /// Whether this reference can in principle be translated to `target`.
    ///
    /// This is a structural check, not a lookup: an account name is representable as a
    /// SID whenever the resolver has a mapping for it, so both current kinds report
    /// `true` for both targets. Rule constructors use this to reject identity kinds
    /// that could never be stored in an ACL.
    #[must_use]
    pub fn can_translate_to(&self, target: IdentityKind) -> bool {
        // both current kinds are mutually representable
        matches!(target, IdentityKind::Sid | IdentityKind::Account)
    }

    /// Borrow the SID if this reference already is one
    #[must_use]
    pub fn as_sid(&self) -> Option<&SecurityIdentifier> {
        match self {
            IdentityReference::Sid(sid) => Some(sid),
            IdentityReference::Account(_) => None,
        }
    }
}

impl fmt::Display for IdentityReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityReference::Sid(sid) => write!(f, "{}", sid),
            IdentityReference::Account(name) => write!(f, "{}", name),
        }
    }
}

impl From<SecurityIdentifier> for IdentityReference {
    fn from(sid: SecurityIdentifier) -> Self {
        IdentityReference::Sid(sid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(
            IdentityReference::Sid(SecurityIdentifier::world()).kind(),
            IdentityKind::Sid
        );
        assert_eq!(
            IdentityReference::Account("DOMAIN\\user".into()).kind(),
            IdentityKind::Account
        );
    }

    #[test]
    fn display_forms() {
        assert_eq!(
            IdentityReference::Sid(SecurityIdentifier::local_system()).to_string(),
            "S-1-5-18"
        );
        assert_eq!(
            IdentityReference::Account("BUILTIN\\Users".into()).to_string(),
            "BUILTIN\\Users"
        );
    }
}
