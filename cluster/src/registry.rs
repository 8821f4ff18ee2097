//! RoleRegistry: lookup table from role directory token to role kind.

use crate::types::RoleKind;
use dspw_common::{ProposalError, Result};
use std::collections::BTreeMap;

/// Immutable mapping of `role-<kind>` tokens to the kinds this build supports.
///
/// Built once and handed to the cluster; tests can build a restricted table
/// with [`RoleRegistry::with_kinds`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRegistry {
    entries: BTreeMap<String, RoleKind>,
}

impl RoleRegistry {
    /// Every role kind
    pub fn standard() -> Self {
        Self::with_kinds(RoleKind::ALL)
    }

    pub fn with_kinds(kinds: impl IntoIterator<Item = RoleKind>) -> Self {
        Self {
            entries: kinds.into_iter().map(|kind| (kind.token(), kind)).collect(),
        }
    }

    pub fn lookup(&self, token: &str) -> Result<RoleKind> {
        self.entries
            .get(token)
            .copied()
            .ok_or_else(|| ProposalError::UnsupportedRole {
                token: token.to_string(),
            })
    }

    pub fn supports(&self, token: &str) -> bool {
        self.entries.contains_key(token)
    }

    /// Supported tokens, in sorted order
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for RoleRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry() {
        let registry = RoleRegistry::standard();

        assert_eq!(registry.len(), 12);
        assert_eq!(registry.lookup("role-admin").unwrap(), RoleKind::Admin);
        assert_eq!(registry.lookup("role-mds-nfs").unwrap(), RoleKind::MdsNfs);
        assert_eq!(registry.lookup("role-master").unwrap(), RoleKind::Master);
        assert!(registry.supports("role-rgw-client"));
    }

    #[test]
    fn test_unknown_token() {
        let registry = RoleRegistry::standard();

        let err = registry.lookup("role-unknownthing").unwrap_err();
        assert!(matches!(err, ProposalError::UnsupportedRole { ref token } if token == "role-unknownthing"));

        // Tokens are exact, no bare names
        assert!(registry.lookup("admin").is_err());
    }

    #[test]
    fn test_restricted_registry() {
        let registry = RoleRegistry::with_kinds([RoleKind::Admin, RoleKind::Mon]);

        assert_eq!(registry.tokens().collect::<Vec<_>>(), vec!["role-admin", "role-mon"]);
        assert!(registry.lookup("role-storage").is_err());
    }
}
