//! Access gate
//!
//! The gate sits in front of API handlers: it resolves the caller's roles,
//! builds a [`UserSession`], and checks grants or rules before a handler
//! runs. Any resolution failure is returned before rules are consulted.

use kvdi_rbac::roles::{aggregate_grants, aggregate_rules};
use kvdi_rbac::{AccessRequest, Grant, Role};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Mutex;

use crate::error::{AuthError, AuthResult};
use crate::resolver::RoleResolver;
use crate::session::UserSession;

/// Gate configuration.
///
/// Every field is optional when deserialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Drop empty and duplicate rules while aggregating roles
    pub skip_empty_rules: bool,

    /// Log rule diagnostics the first time a role is seen
    pub report_rule_diagnostics: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            skip_empty_rules: true,
            report_rule_diagnostics: true,
        }
    }
}

impl GateConfig {
    /// Parse configuration from JSON.
    pub fn from_json(json: &str) -> AuthResult<Self> {
        serde_json::from_str(json).map_err(|e| AuthError::ConfigError(e.to_string()))
    }
}

/// Resolves principals and enforces grants and rules.
///
/// # Example
///
/// ```rust,no_run
/// use kvdi_auth::{AccessGate, StaticRoleResolver};
/// use kvdi_rbac::{Grant, Role};
///
/// # async fn example() -> kvdi_auth::AuthResult<()> {
/// let resolver = StaticRoleResolver::new()
///     .with_role(Role::new("viewer").with_grants(Grant::READ_DESKTOP_SESSIONS))
///     .bind("alice", "viewer");
/// let gate = AccessGate::new(resolver);
///
/// let session = gate.require_grant("alice", Grant::READ_DESKTOP_SESSIONS).await?;
/// assert_eq!(session.user(), "alice");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AccessGate<R> {
    resolver: R,
    config: GateConfig,
    /// Role definitions whose diagnostics were already logged
    reported: Mutex<HashSet<String>>,
}

impl<R: RoleResolver> AccessGate<R> {
    /// Create a gate with default configuration.
    pub fn new(resolver: R) -> Self {
        Self::with_config(resolver, GateConfig::default())
    }

    /// Create a gate with the given configuration.
    pub fn with_config(resolver: R, config: GateConfig) -> Self {
        Self {
            resolver,
            config,
            reported: Mutex::new(HashSet::new()),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Resolve a user's roles into a session.
    pub async fn session(&self, user: &str) -> AuthResult<UserSession> {
        let roles = self.resolver.resolve_roles(user).await?;

        if self.config.report_rule_diagnostics {
            self.report_diagnostics(&roles);
        }

        let rules = aggregate_rules(&roles, self.config.skip_empty_rules);
        let grants = aggregate_grants(&roles);
        let names = roles.into_iter().map(|role| role.name).collect();

        tracing::debug!(
            user = %user,
            rules = rules.len(),
            grants = %grants,
            "Resolved user session"
        );

        Ok(UserSession::new(user, names, rules, grants))
    }

    /// Resolve a session and require a grant.
    pub async fn require_grant(&self, user: &str, grant: Grant) -> AuthResult<UserSession> {
        let session = self.session(user).await?;
        session.require_grant(grant)?;
        Ok(session)
    }

    /// Resolve a session and require that a rule authorizes the request.
    pub async fn authorize(&self, user: &str, request: &AccessRequest) -> AuthResult<UserSession> {
        let session = self.session(user).await?;
        session.require(request)?;
        Ok(session)
    }

    /// Log diagnostics for roles not seen before, keyed by name and rules so
    /// an edited role is checked again. Returns how many were logged.
    fn report_diagnostics(&self, roles: &[Role]) -> usize {
        let mut reported = match self.reported.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut count = 0;
        for role in roles {
            let key = format!("{}:{:?}", role.name, role.rules);
            if !reported.insert(key) {
                continue;
            }
            for (index, rule) in role.rules.iter().enumerate() {
                for diagnostic in rule.validate() {
                    tracing::warn!(
                        role = %role.name,
                        rule = index,
                        %diagnostic,
                        "Role contains a problematic rule"
                    );
                    count += 1;
                }
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::StaticRoleResolver;
    use kvdi_rbac::{Resource, Rule, Verb};

    #[test]
    fn test_config_defaults() {
        let config = GateConfig::default();
        assert!(config.skip_empty_rules);
        assert!(config.report_rule_diagnostics);

        let parsed = GateConfig::from_json(r#"{"skip_empty_rules": false}"#).unwrap();
        assert!(!parsed.skip_empty_rules);
        assert!(parsed.report_rule_diagnostics);

        let empty = GateConfig::from_json("{}").unwrap();
        assert!(empty.skip_empty_rules);
    }

    #[test]
    fn test_config_invalid() {
        let err = GateConfig::from_json(r#"{"skip_empty_rules": "yes"}"#).unwrap_err();
        assert!(matches!(err, AuthError::ConfigError(_)));
    }

    fn role_with_unknown_verb() -> Role {
        Role::new("typo").with_rule(
            Rule::new()
                .with_verbs([Verb::from("raed")])
                .with_resources([Resource::Users]),
        )
    }

    #[test]
    fn test_diagnostics_reported_once_per_role_definition() {
        let broken = Role::new("broken").with_rule(
            Rule::new()
                .with_verbs([Verb::Read])
                .with_resources([Resource::Users])
                .with_resource_patterns(["(unclosed"]),
        );
        let gate = AccessGate::new(StaticRoleResolver::new());
        let roles = vec![broken.clone()];

        assert_eq!(gate.report_diagnostics(&roles), 1);
        assert_eq!(gate.report_diagnostics(&roles), 0);

        // Editing the role makes it eligible again
        let edited = broken.with_rule(
            Rule::new()
                .with_verbs([Verb::from("patch")])
                .with_resources([Resource::Users]),
        );
        assert_eq!(gate.report_diagnostics(&[edited]), 2);
    }

    #[tokio::test]
    async fn test_repeated_sessions_do_not_report_again() {
        let resolver = StaticRoleResolver::new()
            .with_role(role_with_unknown_verb())
            .bind("alice", "typo");
        let gate = AccessGate::new(resolver);

        for _ in 0..3 {
            let session = gate.session("alice").await.unwrap();
            assert_eq!(session.rules().len(), 1);
        }
        assert_eq!(gate.report_diagnostics(&[role_with_unknown_verb()]), 0);
    }

    #[tokio::test]
    async fn test_reporting_disabled() {
        let resolver = StaticRoleResolver::new()
            .with_role(role_with_unknown_verb())
            .bind("alice", "typo");
        let config = GateConfig {
            report_rule_diagnostics: false,
            ..GateConfig::default()
        };
        let gate = AccessGate::with_config(resolver, config);

        gate.session("alice").await.unwrap();
        assert_eq!(gate.report_diagnostics(&[role_with_unknown_verb()]), 1);
    }
}
