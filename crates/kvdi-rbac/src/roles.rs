//! Roles and role aggregation
//!
//! A role is a named list of rules plus a grant mask. A principal bound to
//! several roles is authorized by the union of all of them: rules are
//! concatenated and grant masks are OR-ed together.

use serde::{Deserialize, Serialize};

use crate::error::RbacResult;
use crate::grants::Grant;
use crate::rule_set::RuleSet;
use crate::rules::Rule;

/// A named collection of rules and API grants.
///
/// Role documents are JSON records with optional fields; anything absent
/// deserializes to an empty list or an empty mask.
///
/// # Examples
///
/// ```
/// use kvdi_rbac::{Grant, Role};
///
/// let role = Role::from_json(r#"{
///     "name": "launcher",
///     "rules": [{"verbs": ["launch"], "resources": ["templates"]}],
///     "grants": 64
/// }"#).unwrap();
///
/// assert_eq!(role.rules.len(), 1);
/// assert!(role.grants.has(Grant::LAUNCH_TEMPLATES));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Role {
    /// Role name
    #[serde(default)]
    pub name: String,

    /// Access control rules
    #[serde(default)]
    pub rules: Vec<Rule>,

    /// API grants
    #[serde(default)]
    pub grants: Grant,
}

impl Role {
    /// Create a new role with no rules or grants.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
            grants: Grant::NONE,
        }
    }

    /// Append a rule.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Add grants to the role's mask.
    pub fn with_grants(mut self, grants: Grant) -> Self {
        self.grants |= grants;
        self
    }

    /// Parse a single role document.
    pub fn from_json(json: &str) -> RbacResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a JSON array of role documents.
    pub fn many_from_json(json: &str) -> RbacResult<Vec<Self>> {
        Ok(serde_json::from_str(json)?)
    }

    /// Get this role's rules as a [`RuleSet`].
    pub fn rule_set(&self) -> RuleSet {
        self.rules.iter().cloned().collect()
    }
}

/// Union the rules of every role.
///
/// With `skip_empty`, empty and deep-equal duplicate rules are dropped.
/// Decisions are the same either way.
pub fn aggregate_rules<'a, I>(roles: I, skip_empty: bool) -> RuleSet
where
    I: IntoIterator<Item = &'a Role>,
{
    let mut set = RuleSet::new();
    for role in roles {
        for rule in &role.rules {
            if skip_empty {
                set.add_unique(rule.clone());
            } else {
                set.add(rule.clone());
            }
        }
    }
    set
}

/// Union the grant masks of every role.
pub fn aggregate_grants<'a, I>(roles: I) -> Grant
where
    I: IntoIterator<Item = &'a Role>,
{
    roles.into_iter().map(|role| role.grants).collect()
}
