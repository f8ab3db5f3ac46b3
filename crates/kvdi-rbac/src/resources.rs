//! # Resources
//!
//! Defines the resource types a rule may apply to, and the namespace wildcard.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::RbacError;

/// Namespace literal matching every namespace.
pub const NAMESPACE_ALL: &str = "*";

/// Resource types that can have rules applied to them.
///
/// `ServiceAccounts` is special: only the `use` verb is meaningful for it,
/// and using one means assuming that identity when launching a session.
/// Enforcing that narrower meaning is left to whoever consumes the rule.
///
/// Unrecognized literals are kept as [`Resource::Other`] and match the
/// wildcard and the identical literal. Resources compare by their literal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Resource {
    /// kvdi users.
    Users,
    /// kvdi roles.
    Roles,
    /// Desktop templates.
    Templates,
    /// Kubernetes service accounts assumable by sessions.
    ServiceAccounts,
    /// Wildcard matching every resource type.
    All,
    /// A literal this version does not recognize.
    Other(String),
}

impl Resource {
    /// Get the string representation of the resource type.
    pub fn as_str(&self) -> &str {
        match self {
            Resource::Users => "users",
            Resource::Roles => "roles",
            Resource::Templates => "templates",
            Resource::ServiceAccounts => "serviceaccounts",
            Resource::All => "*",
            Resource::Other(s) => s.as_str(),
        }
    }

    /// Parse a resource type from its literal.
    ///
    /// # Example
    ///
    /// ```
    /// use kvdi_rbac::Resource;
    ///
    /// assert_eq!(Resource::parse("templates"), Some(Resource::Templates));
    /// assert_eq!(Resource::parse("*"), Some(Resource::All));
    /// assert_eq!(Resource::parse("pods"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "users" => Some(Resource::Users),
            "roles" => Some(Resource::Roles),
            "templates" => Some(Resource::Templates),
            "serviceaccounts" => Some(Resource::ServiceAccounts),
            "*" => Some(Resource::All),
            _ => None,
        }
    }

    /// Get all recognized resource types, wildcard excluded.
    pub fn all() -> Vec<Self> {
        vec![
            Resource::Users,
            Resource::Roles,
            Resource::Templates,
            Resource::ServiceAccounts,
        ]
    }

    /// Check if this is the wildcard resource.
    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }

    /// Check if this literal is one of the recognized resource types.
    pub fn is_known(&self) -> bool {
        Resource::parse(self.as_str()).is_some()
    }
}

// Equality goes through the literal, so `Other("read")` and `Read` are the
// same resource in matching, in `deep_equal`, and after a serde round-trip.
impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Resource {}

impl Hash for Resource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl From<String> for Resource {
    fn from(s: String) -> Self {
        Resource::parse(&s).unwrap_or(Resource::Other(s))
    }
}

impl From<&str> for Resource {
    fn from(s: &str) -> Self {
        Resource::parse(s).unwrap_or_else(|| Resource::Other(s.to_string()))
    }
}

impl From<Resource> for String {
    fn from(resource: Resource) -> Self {
        match resource {
            Resource::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for Resource {
    type Err = RbacError;

    /// Strict parse: unrecognized literals are an error here, unlike deserialization.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::parse(s).ok_or_else(|| RbacError::UnknownResource(s.to_string()))
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
