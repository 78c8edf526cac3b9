//! Users as the directory service sees them
//!
//! A user is immutable in any request flow; only directory admin operations
//! change the stored record.

use crate::UserId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A user record: identity plus the authorisations and roles rules see
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Directory identity
    pub id: UserId,

    /// Data authorisations, e.g. visibility labels the user may read
    #[serde(default)]
    pub auths: BTreeSet<String>,

    /// Roles, e.g. "user", "admin"
    #[serde(default)]
    pub roles: BTreeSet<String>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: UserId::new(id),
            auths: BTreeSet::new(),
            roles: BTreeSet::new(),
        }
    }

    pub fn with_auths<I, S>(mut self, auths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.auths.extend(auths.into_iter().map(Into::into));
        self
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    pub fn has_auth(&self, auth: &str) -> bool {
        self.auths.contains(auth)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_accumulates() {
        let user = User::new("alice")
            .with_auths(["public", "private"])
            .with_roles(["user"]);
        assert!(user.has_auth("private"));
        assert!(user.has_role("user"));
        assert!(!user.has_role("admin"));
    }
}
