//! User sessions
//!
//! A session is the materialized authorization state of one principal: the
//! union of rules and the OR of grants over every role bound to it.

use kvdi_rbac::{AccessRequest, Grant, RuleSet};

use crate::error::{AuthError, AuthResult};

/// The resolved authorization state of a user.
///
/// Sessions are read-only once built and can be shared across tasks.
#[derive(Debug, Clone)]
pub struct UserSession {
    user: String,
    roles: Vec<String>,
    rules: RuleSet,
    grants: Grant,
}

impl UserSession {
    /// Create a session from already aggregated rules and grants.
    pub fn new(user: impl Into<String>, roles: Vec<String>, rules: RuleSet, grants: Grant) -> Self {
        Self {
            user: user.into(),
            roles,
            rules,
            grants,
        }
    }

    /// The user this session belongs to.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Names of the roles the session was built from.
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// The aggregated rules.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// The aggregated grant mask.
    pub fn grants(&self) -> Grant {
        self.grants
    }

    /// Check if the session holds a grant. Non-strict for composite masks.
    pub fn has_grant(&self, grant: Grant) -> bool {
        self.grants.has(grant)
    }

    /// Require a grant, or fail with a forbidden error naming it.
    pub fn require_grant(&self, grant: Grant) -> AuthResult<()> {
        if self.has_grant(grant) {
            return Ok(());
        }
        tracing::debug!(
            user = %self.user,
            grant = %grant,
            held = %self.grants,
            "Denied: missing grant"
        );
        Err(AuthError::missing_grant(grant))
    }

    /// Check if any rule authorizes the request.
    pub fn can(&self, request: &AccessRequest) -> bool {
        self.rules.authorizes(request)
    }

    /// Require that a rule authorizes the request.
    ///
    /// The forbidden message describes the attempted action only.
    pub fn require(&self, request: &AccessRequest) -> AuthResult<()> {
        if self.can(request) {
            return Ok(());
        }
        tracing::debug!(
            user = %self.user,
            verb = %request.verb,
            resource = %request.resource,
            name = ?request.name,
            namespace = ?request.namespace,
            "Denied: no rule authorizes request"
        );
        Err(AuthError::Forbidden(describe(request)))
    }
}

fn describe(request: &AccessRequest) -> String {
    let mut message = format!("User cannot {} {}", request.verb, request.resource);
    if let Some(name) = &request.name {
        message.push(' ');
        message.push_str(name);
    }
    if let Some(namespace) = &request.namespace {
        message.push_str(" in namespace ");
        message.push_str(namespace);
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvdi_rbac::{Resource, Rule, Verb};

    fn session() -> UserSession {
        let rules: RuleSet = [Rule::new()
            .with_verbs([Verb::Read])
            .with_resources([Resource::Templates])
            .with_resource_patterns(["^public-"])]
        .into_iter()
        .collect();
        UserSession::new(
            "alice",
            vec!["viewer".to_string()],
            rules,
            Grant::READ_TEMPLATES,
        )
    }

    #[test]
    fn test_require_grant() {
        let session = session();
        assert!(session.require_grant(Grant::READ_TEMPLATES).is_ok());

        let err = session.require_grant(Grant::READ_DESKTOP_SESSIONS).unwrap_err();
        assert!(err.is_forbidden());
        assert_eq!(
            err.to_string(),
            "Forbidden: User does not have ReadDesktopSessions grant"
        );
    }

    #[test]
    fn test_require_rule() {
        let session = session();
        let read = |name: &str| AccessRequest::new(Verb::Read, Resource::Templates).with_name(name);
        let allowed = read("public-ubuntu");
        let denied = read("private-arch");
        assert!(session.can(&allowed));
        assert!(session.require(&allowed).is_ok());

        let err = session.require(&denied).unwrap_err();
        assert_eq!(err.status_code(), 403);
        let message = err.to_string();
        assert!(message.contains("read templates private-arch"));
        assert!(!message.contains("public-"));
    }

    #[test]
    fn test_accessors() {
        let session = session();
        assert_eq!(session.user(), "alice");
        assert_eq!(session.roles(), &["viewer".to_string()]);
        assert_eq!(session.rules().len(), 1);
        assert_eq!(session.grants(), Grant::READ_TEMPLATES);
    }
}
