//! # Verbs
//!
//! Defines the actions a rule may permit.
//! A verb is matched verbatim, with `*` acting as a wildcard for every verb.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::RbacError;

/// Actions that a [`Rule`](crate::rules::Rule) can permit.
///
/// - **Create**: Create users, roles, or templates
/// - **Read**: View users, roles, or templates
/// - **Update**: Modify existing users, roles, or templates
/// - **Delete**: Remove users, roles, or templates
/// - **Use**: Assume a service account when launching a session
/// - **Launch**: Launch a desktop session from a template
/// - **All**: Wildcard (`*`), matches every verb
///
/// Literals outside this list are kept as [`Verb::Other`] so that stored
/// rules round-trip unchanged. They match the wildcard and the identical
/// literal, like any other verb. Verbs compare by their literal, so an
/// `Other` holding a recognized literal equals the named variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Verb {
    /// Create new resources.
    Create,
    /// Read/view resources.
    Read,
    /// Update existing resources.
    Update,
    /// Delete resources.
    Delete,
    /// Use a resource. Only meaningful for service accounts.
    Use,
    /// Launch a session from a template.
    Launch,
    /// Wildcard matching every verb.
    All,
    /// A literal this version does not recognize.
    Other(String),
}

impl Verb {
    /// Get the string representation of the verb.
    ///
    /// # Returns
    ///
    /// The literal used in rule definitions (`"*"` for the wildcard).
    pub fn as_str(&self) -> &str {
        match self {
            Verb::Create => "create",
            Verb::Read => "read",
            Verb::Update => "update",
            Verb::Delete => "delete",
            Verb::Use => "use",
            Verb::Launch => "launch",
            Verb::All => "*",
            Verb::Other(s) => s.as_str(),
        }
    }

    /// Parse a verb from its literal.
    ///
    /// Matching is exact, since rule comparison is done on the raw strings.
    ///
    /// # Example
    ///
    /// ```
    /// use kvdi_rbac::Verb;
    ///
    /// assert_eq!(Verb::parse("launch"), Some(Verb::Launch));
    /// assert_eq!(Verb::parse("*"), Some(Verb::All));
    /// assert_eq!(Verb::parse("LAUNCH"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "create" => Some(Verb::Create),
            "read" => Some(Verb::Read),
            "update" => Some(Verb::Update),
            "delete" => Some(Verb::Delete),
            "use" => Some(Verb::Use),
            "launch" => Some(Verb::Launch),
            "*" => Some(Verb::All),
            _ => None,
        }
    }

    /// Get all recognized verbs, wildcard excluded.
    pub fn all() -> Vec<Self> {
        vec![
            Verb::Create,
            Verb::Read,
            Verb::Update,
            Verb::Delete,
            Verb::Use,
            Verb::Launch,
        ]
    }

    /// Check if this is the wildcard verb.
    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }

    /// Check if this literal is one of the recognized verbs.
    pub fn is_known(&self) -> bool {
        Verb::parse(self.as_str()).is_some()
    }
}

// Equality goes through the literal, so `Other("read")` and `Read` are the
// same verb in matching, in `deep_equal`, and after a serde round-trip.
impl PartialEq for Verb {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Verb {}

impl Hash for Verb {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl From<String> for Verb {
    fn from(s: String) -> Self {
        Verb::parse(&s).unwrap_or(Verb::Other(s))
    }
}

impl From<&str> for Verb {
    fn from(s: &str) -> Self {
        Verb::parse(s).unwrap_or_else(|| Verb::Other(s.to_string()))
    }
}

impl From<Verb> for String {
    fn from(verb: Verb) -> Self {
        match verb {
            Verb::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for Verb {
    type Err = RbacError;

    /// Strict parse: unrecognized literals are an error here, unlike deserialization.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verb::parse(s).ok_or_else(|| RbacError::UnknownVerb(s.to_string()))
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
