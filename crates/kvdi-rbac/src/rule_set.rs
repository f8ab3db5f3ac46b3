//! # Rule Sets
//!
//! Aggregation of rules across roles, and the authorization decision.
//!
//! A request is authorized when at least one rule in the set satisfies
//! every dimension:
//!
//! ```text
//! verb        rule.has_verb(verb)                        mandatory
//! resource    rule.has_resource_type(resource)           mandatory
//! name        rule.matches_resource_name(name)           only if a name is given
//!                                                        and the rule has patterns
//! namespace   rule.has_namespace(namespace)              only if a namespace is given
//!                                                        and the request is a template launch
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::resources::Resource;
use crate::rules::{Rule, RuleDiagnostic};
use crate::verbs::Verb;

/// An action to authorize.
///
/// # Example
///
/// ```
/// use kvdi_rbac::{AccessRequest, Resource, Verb};
///
/// let request = AccessRequest::launch_template("ubuntu-xfce", "team-a");
/// assert_eq!(request.verb, Verb::Launch);
/// assert_eq!(request.resource, Resource::Templates);
/// assert!(request.is_namespace_scoped());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequest {
    /// The action being performed.
    pub verb: Verb,
    /// The type of resource being acted on.
    pub resource: Resource,
    /// The name of the resource, when the action targets one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The namespace the action is scoped to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl AccessRequest {
    /// Create a request without a name or namespace.
    pub fn new(verb: Verb, resource: Resource) -> Self {
        Self {
            verb,
            resource,
            name: None,
            namespace: None,
        }
    }

    /// Target a named resource.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Scope the request to a namespace.
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Launch the named template in a namespace.
    pub fn launch_template(template: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self::new(Verb::Launch, Resource::Templates)
            .with_name(template)
            .in_namespace(namespace)
    }

    /// Assume the named service account for a session.
    pub fn use_service_account(account: impl Into<String>) -> Self {
        Self::new(Verb::Use, Resource::ServiceAccounts).with_name(account)
    }

    /// Check if the namespace dimension applies to this request.
    ///
    /// Namespaces are only evaluated for template launches. A namespace set
    /// on any other request is ignored.
    pub fn is_namespace_scoped(&self) -> bool {
        self.namespace.is_some()
            && self.verb == Verb::Launch
            && self.resource == Resource::Templates
    }

    fn scoped_namespace(&self) -> Option<&str> {
        if self.is_namespace_scoped() {
            self.namespace.as_deref()
        } else {
            None
        }
    }
}

impl Rule {
    /// Check if this rule alone authorizes the request.
    ///
    /// Verbs and resource types must match. Resource patterns and namespaces
    /// only narrow the rule when it lists any.
    pub fn authorizes(&self, request: &AccessRequest) -> bool {
        if !self.has_verb(&request.verb) || !self.has_resource_type(&request.resource) {
            return false;
        }

        if let Some(name) = request.name.as_deref() {
            if !self.resource_patterns.is_empty() && !self.matches_resource_name(name) {
                return false;
            }
        }

        if let Some(namespace) = request.scoped_namespace() {
            if !self.namespaces.is_empty() && !self.has_namespace(namespace) {
                return false;
            }
        }

        true
    }
}

/// The union of rules from every role bound to a principal.
///
/// # Example
///
/// ```
/// use kvdi_rbac::{AccessRequest, Resource, Rule, RuleSet, Verb};
///
/// let mut rules = RuleSet::new();
/// rules.add(
///     Rule::new()
///         .with_verbs([Verb::Launch])
///         .with_resources([Resource::Templates])
///         .with_namespaces(["team-a"]),
/// );
///
/// assert!(rules.authorizes(&AccessRequest::launch_template("desktop", "team-a")));
/// assert!(!rules.authorizes(&AccessRequest::launch_template("desktop", "team-b")));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Create a new empty rule set.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add a rule, keeping duplicates and empty rules.
    pub fn add(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Add a rule unless it is empty or deep-equal to one already present.
    ///
    /// # Returns
    ///
    /// `true` if the rule was added
    pub fn add_unique(&mut self, rule: Rule) -> bool {
        if rule.is_empty() {
            tracing::trace!("Skipping empty rule");
            return false;
        }
        if self.contains(&rule) {
            tracing::trace!(?rule, "Skipping duplicate rule");
            return false;
        }
        self.rules.push(rule);
        true
    }

    /// Add multiple rules with [`RuleSet::add`].
    pub fn add_all<I>(&mut self, rules: I)
    where
        I: IntoIterator<Item = Rule>,
    {
        self.rules.extend(rules);
    }

    /// Merge another rule set into this one.
    pub fn merge(&mut self, other: &RuleSet) {
        self.rules.extend(other.rules.iter().cloned());
    }

    /// Check if a deep-equal rule is already in the set.
    pub fn contains(&self, rule: &Rule) -> bool {
        self.rules.iter().any(|r| r.deep_equal(rule))
    }

    /// Check if any rule authorizes the request.
    ///
    /// An empty set authorizes nothing.
    pub fn authorizes(&self, request: &AccessRequest) -> bool {
        self.rules.iter().any(|rule| rule.authorizes(request))
    }

    /// Get the rules in this set.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Get the count of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run [`Rule::validate`] over every rule.
    ///
    /// # Returns
    ///
    /// `(rule index, diagnostic)` pairs, in rule order
    pub fn validate(&self) -> Vec<(usize, RuleDiagnostic)> {
        self.rules
            .iter()
            .enumerate()
            .flat_map(|(index, rule)| rule.validate().into_iter().map(move |d| (index, d)))
            .collect()
    }

    /// Check if both sets hold deep-equal rules, in any order.
    ///
    /// Every rule on either side must pair with a distinct deep-equal rule
    /// on the other, so duplicate rules are counted.
    pub fn deep_equal(&self, other: &RuleSet) -> bool {
        if self.rules.len() != other.rules.len() {
            return false;
        }
        let mut unmatched: Vec<&Rule> = other.rules.iter().collect();
        for rule in &self.rules {
            match unmatched.iter().position(|r| r.deep_equal(rule)) {
                Some(pos) => {
                    unmatched.swap_remove(pos);
                }
                None => return false,
            }
        }
        true
    }

    /// Compile every resource pattern once for repeated evaluation.
    pub fn compile(&self) -> CompiledRuleSet {
        CompiledRuleSet {
            rules: self.rules.iter().map(CompiledRule::new).collect(),
        }
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<T: IntoIterator<Item = Rule>>(iter: T) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// A [`RuleSet`] with its resource patterns compiled ahead of time.
///
/// Decisions are identical to the source set. Patterns that fail to
/// compile are dropped, the same way evaluation skips them.
#[derive(Debug, Clone)]
pub struct CompiledRuleSet {
    rules: Vec<CompiledRule>,
}

impl CompiledRuleSet {
    /// Check if any rule authorizes the request.
    pub fn authorizes(&self, request: &AccessRequest) -> bool {
        self.rules.iter().any(|rule| rule.authorizes(request))
    }

    /// Get the count of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: Rule,
    patterns: Vec<Regex>,
}

impl CompiledRule {
    fn new(rule: &Rule) -> Self {
        Self {
            patterns: rule
                .resource_patterns
                .iter()
                .filter_map(|p| Regex::new(p).ok())
                .collect(),
            rule: rule.clone(),
        }
    }

    fn authorizes(&self, request: &AccessRequest) -> bool {
        if !self.rule.has_verb(&request.verb) || !self.rule.has_resource_type(&request.resource) {
            return false;
        }

        if let Some(name) = request.name.as_deref() {
            // Scoping is decided by the raw list, so a rule whose patterns
            // are all invalid still denies every name.
            if !self.rule.resource_patterns.is_empty()
                && !self.patterns.iter().any(|re| re.is_match(name))
            {
                return false;
            }
        }

        if let Some(namespace) = request.scoped_namespace() {
            if !self.rule.namespaces.is_empty() && !self.rule.has_namespace(namespace) {
                return false;
            }
        }

        true
    }
}
