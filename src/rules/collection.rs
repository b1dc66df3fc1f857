//! The immutable, ordered collection returned by rule queries.

use std::ops::Index;

use crate::rules::AuthorizationRule;

/// An ordered, randomly-indexable collection of authorization rules.
///
/// This is the only type rule queries return. It is built fresh for every query, detached
/// from the live ACL (no shared storage), and append-only during construction - once
/// returned it never changes, so it is safe to read from any thread without holding a
/// lock, indefinitely.
///
/// Rule order equals ACE order in the source ACL; explicit and inherited entries appear
/// interleaved exactly as stored.
///
/// # Examples
///
/// ```rust,no_run
/// # use aclscope::rules::AuthorizationRuleCollection;
/// # fn get(collection: AuthorizationRuleCollection) {
/// for rule in &collection {
///     println!("{} -> 0x{:X}", rule.identity(), rule.access_mask());
/// }
/// # }
/// ```
#[derive(Debug, Default, Clone)]
pub struct AuthorizationRuleCollection {
    rules: Vec<AuthorizationRule>,
}

impl AuthorizationRuleCollection {
    /// Create an empty collection
    #[must_use]
    pub(crate) fn new() -> Self {
        AuthorizationRuleCollection { rules: Vec::new() }
    }

    /// Append a rule during snapshot construction
    pub(crate) fn add_rule(&mut self, rule: AuthorizationRule) {
        self.rules.push(rule);
    }

    /// Number of rules in the collection
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the collection holds no rules
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The rule at `index`, if within bounds
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&AuthorizationRule> {
        self.rules.get(index)
    }

    /// Iterate the rules in ACL order
    pub fn iter(&self) -> std::slice::Iter<'_, AuthorizationRule> {
        self.rules.iter()
    }
}

impl Index<usize> for AuthorizationRuleCollection {
    type Output = AuthorizationRule;

    fn index(&self, index: usize) -> &Self::Output {
        &self.rules[index]
    }
}

impl<'a> IntoIterator for &'a AuthorizationRuleCollection {
    type Item = &'a AuthorizationRule;
    type IntoIter = std::slice::Iter<'a, AuthorizationRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

impl IntoIterator for AuthorizationRuleCollection {
    type Item = AuthorizationRule;
    type IntoIter = std::vec::IntoIter<AuthorizationRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.into_iter()
    }
}
