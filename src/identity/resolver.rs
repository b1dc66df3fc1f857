//! Identity translation between SIDs and account names.
//!
//! The rule engine needs exactly two things from identity resolution: normalizing a rule's
//! identity to the canonical SID form before it touches an ACL, and translating a whole
//! ACL's worth of SIDs to a caller-requested kind in one batched call during queries.
//! [`IdentityResolver`] captures that contract; [`AccountDirectory`] is the in-process
//! implementation backed by a registered SID / account-name table.

use std::collections::HashMap;

use dashmap::DashMap;

use crate::{
    identity::{IdentityKind, IdentityReference, SecurityIdentifier},
    Result,
};

/// Translation service between identity kinds.
///
/// Implementations must be cheap to call for same-kind translations and must implement
/// [`IdentityResolver::translate_all`] as a single batched operation: query snapshots
/// translate N identities with one call so that duplicate identities can be
/// short-circuited and every identity in a snapshot is resolved against the same state.
///
/// # Thread Safety
///
/// Resolvers are shared across reader threads; implementations must be `Send + Sync`.
pub trait IdentityResolver: Send + Sync {
    /// Whether `kind` is a kind this resolver can translate into
    fn is_valid_target_kind(&self, kind: IdentityKind) -> bool;

    /// Translate one identity to the target kind
    ///
    /// # Errors
    /// Returns [`crate::Error::IdentityNotMapped`] if no mapping exists for `identity`
    fn translate(
        &self,
        identity: &IdentityReference,
        target: IdentityKind,
    ) -> Result<IdentityReference>;

    /// Translate a set of identities to the target kind in one call
    ///
    /// The result is positionally aligned with the input. Implementations should resolve
    /// duplicate inputs once rather than per occurrence.
    ///
    /// # Errors
    /// Returns the first translation failure; no partial result is produced
    fn translate_all(
        &self,
        identities: &[IdentityReference],
        target: IdentityKind,
    ) -> Result<Vec<IdentityReference>>;
}

/// An in-process identity resolver over a registered SID / account-name table.
///
/// Mappings are registered up front with [`AccountDirectory::register`]; lookups in both
/// directions are lock-free reads. Identities already in the requested kind pass through
/// without consulting the table, mirroring how translation to one's own kind is always
/// the identity function.
///
/// # Examples
///
/// ```rust
/// use aclscope::identity::{
///     AccountDirectory, IdentityKind, IdentityReference, IdentityResolver, SecurityIdentifier,
/// };
///
/// let directory = AccountDirectory::new();
/// directory.register(SecurityIdentifier::builtin_administrators(), "BUILTIN\\Administrators");
///
/// let translated = directory.translate(
///     &IdentityReference::Account("BUILTIN\\Administrators".to_string()),
///     IdentityKind::Sid,
/// )?;
/// assert_eq!(translated.to_string(), "S-1-5-32-544");
/// # Ok::<(), aclscope::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct AccountDirectory {
    by_sid: DashMap<SecurityIdentifier, String>,
    by_account: DashMap<String, SecurityIdentifier>,
}

impl AccountDirectory {
    /// Create an empty directory
    #[must_use]
    pub fn new() -> Self {
        AccountDirectory {
            by_sid: DashMap::new(),
            by_account: DashMap::new(),
        }
    }

    /// Register a bidirectional SID / account-name mapping
    ///
    /// Re-registering either side replaces the previous mapping for that side.
    pub fn register(&self, sid: SecurityIdentifier, account: &str) {
        self.by_sid.insert(sid.clone(), account.to_string());
        self.by_account.insert(account.to_string(), sid);
    }

    /// Number of registered mappings
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_sid.len()
    }

    /// Whether the directory has no mappings
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_sid.is_empty()
    }
}

impl IdentityResolver for AccountDirectory {
    fn is_valid_target_kind(&self, kind: IdentityKind) -> bool {
        matches!(kind, IdentityKind::Sid | IdentityKind::Account)
    }

    fn translate(
        &self,
        identity: &IdentityReference,
        target: IdentityKind,
    ) -> Result<IdentityReference> {
        match (identity, target) {
            (IdentityReference::Sid(_), IdentityKind::Sid)
            | (IdentityReference::Account(_), IdentityKind::Account) => Ok(identity.clone()),
            (IdentityReference::Sid(sid), IdentityKind::Account) => self
                .by_sid
                .get(sid)
                .map(|entry| IdentityReference::Account(entry.value().clone()))
                .ok_or_else(|| crate::Error::IdentityNotMapped(sid.to_string())),
            (IdentityReference::Account(name), IdentityKind::Sid) => self
                .by_account
                .get(name)
                .map(|entry| IdentityReference::Sid(entry.value().clone()))
                .ok_or_else(|| crate::Error::IdentityNotMapped(name.clone())),
        }
    }

    fn translate_all(
        &self,
        identities: &[IdentityReference],
        target: IdentityKind,
    ) -> Result<Vec<IdentityReference>> {
        // Duplicate identities are resolved once and reused
        let mut resolved: HashMap<&IdentityReference, IdentityReference> = HashMap::new();
        let mut result = Vec::with_capacity(identities.len());

        for identity in identities {
            if let Some(hit) = resolved.get(identity) {
                result.push(hit.clone());
                continue;
            }

            let translated = self.translate(identity, target)?;
            resolved.insert(identity, translated.clone());
            result.push(translated);
        }

        Ok(result)
    }
}
