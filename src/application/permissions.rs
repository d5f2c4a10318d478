//! # Permission Gate
//!
//! Claim and administrator checks run by the router before a gated handler executes.
//! Users are matched case-insensitively against the `permissions` section of the config.

use crate::domain::config::PermissionsConfig;

/// Named permission bits a command can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    ManageClassAdd,
}

impl Claim {
    pub fn as_str(&self) -> &'static str {
        match self {
            Claim::ManageClassAdd => "manage_class_add",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PermissionGate {
    config: PermissionsConfig,
}

impl PermissionGate {
    pub fn new(config: PermissionsConfig) -> Self {
        Self { config }
    }

    pub fn is_admin(&self, user: &str) -> bool {
        contains_user(&self.config.admins, user)
    }

    /// Administrators implicitly hold every claim.
    pub fn has_claim(&self, user: &str, claim: Claim) -> bool {
        if self.is_admin(user) {
            return true;
        }
        self.config
            .claims
            .get(claim.as_str())
            .is_some_and(|users| contains_user(users, user))
    }
}

fn contains_user(list: &[String], user: &str) -> bool {
    list.iter().any(|a| a.eq_ignore_ascii_case(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn gate() -> PermissionGate {
        let mut claims = HashMap::new();
        claims.insert(
            "manage_class_add".to_string(),
            vec!["@Prof:example.org".to_string()],
        );
        PermissionGate::new(PermissionsConfig {
            admins: vec!["@root:example.org".to_string()],
            claims,
        })
    }

    #[test]
    fn test_claim_holder_allowed() {
        assert!(gate().has_claim("@prof:example.org", Claim::ManageClassAdd));
    }

    #[test]
    fn test_user_without_claim_denied() {
        let gate = gate();
        assert!(!gate.has_claim("@student:example.org", Claim::ManageClassAdd));
        assert!(!gate.is_admin("@prof:example.org"));
    }

    #[test]
    fn test_admin_holds_all_claims() {
        let gate = gate();
        assert!(gate.is_admin("@ROOT:example.org"));
        assert!(gate.has_claim("@root:example.org", Claim::ManageClassAdd));
    }
}
