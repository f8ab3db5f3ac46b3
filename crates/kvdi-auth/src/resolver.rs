//! Role resolution
//!
//! The gate does not know where role bindings live. A [`RoleResolver`]
//! materializes the roles bound to a user; [`StaticRoleResolver`] keeps
//! them in memory.

use async_trait::async_trait;
use kvdi_rbac::Role;
use std::collections::HashMap;

use crate::error::{AuthError, AuthResult};

/// Trait for looking up the roles bound to a user.
#[async_trait]
pub trait RoleResolver: Send + Sync {
    /// Get every role bound to the user.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Unauthenticated`] if the user is unknown
    /// - [`AuthError::RoleResolution`] if the bindings cannot be materialized
    async fn resolve_roles(&self, user: &str) -> AuthResult<Vec<Role>>;
}

/// In-memory role definitions and user bindings.
///
/// # Example
///
/// ```
/// use kvdi_auth::StaticRoleResolver;
/// use kvdi_rbac::{Grant, Role};
///
/// let resolver = StaticRoleResolver::new()
///     .with_role(Role::new("viewer").with_grants(Grant::READ_TEMPLATES))
///     .bind("alice", "viewer");
///
/// assert_eq!(resolver.role_names("alice"), Some(&["viewer".to_string()][..]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticRoleResolver {
    roles: HashMap<String, Role>,
    bindings: HashMap<String, Vec<String>>,
}

impl StaticRoleResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver from a JSON array of role documents.
    pub fn from_roles_json(json: &str) -> AuthResult<Self> {
        let roles =
            Role::many_from_json(json).map_err(|e| AuthError::ConfigError(e.to_string()))?;
        Ok(roles
            .into_iter()
            .fold(Self::new(), |resolver, role| resolver.with_role(role)))
    }

    /// Register a role, replacing any role with the same name.
    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.insert(role.name.clone(), role);
        self
    }

    /// Bind a user to a role by name.
    pub fn bind(mut self, user: impl Into<String>, role: impl Into<String>) -> Self {
        self.bindings.entry(user.into()).or_default().push(role.into());
        self
    }

    /// Get the names of the roles bound to a user.
    pub fn role_names(&self, user: &str) -> Option<&[String]> {
        self.bindings.get(user).map(Vec::as_slice)
    }
}

#[async_trait]
impl RoleResolver for StaticRoleResolver {
    async fn resolve_roles(&self, user: &str) -> AuthResult<Vec<Role>> {
        let names = self.bindings.get(user).ok_or(AuthError::Unauthenticated)?;
        names
            .iter()
            .map(|name| {
                self.roles.get(name).cloned().ok_or_else(|| {
                    AuthError::RoleResolution(format!(
                        "user {} is bound to unknown role {}",
                        user, name
                    ))
                })
            })
            .collect()
    }
}
