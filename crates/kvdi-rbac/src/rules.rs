//! # Rules
//!
//! A rule is a single access control statement made of four independent
//! dimensions: verbs, resource types, resource name patterns, and namespaces.
//!
//! Every operation here is a pure predicate over the rule's fields. Matching
//! never fails: a resource pattern that does not compile is skipped as if it
//! were absent. Use [`Rule::validate`] to surface such patterns at authoring
//! time instead.

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resources::{Resource, NAMESPACE_ALL};
use crate::verbs::Verb;

/// A set of permissions applied to a role.
///
/// Resembles a Kubernetes `PolicyRule`, with resource names matched by
/// regular expressions and the addition of a namespace selector.
///
/// An empty collection in any field matches nothing for that field. How
/// that plays out when authorizing a request is described on
/// [`RuleSet::authorizes`](crate::rule_set::RuleSet::authorizes).
///
/// `Rule` intentionally does not implement `PartialEq`. Structural equality
/// ignores ordering and is provided by [`Rule::deep_equal`].
///
/// # Example
///
/// ```
/// use kvdi_rbac::{Resource, Rule, Verb};
///
/// let rule = Rule::new()
///     .with_verbs([Verb::Launch])
///     .with_resources([Resource::Templates])
///     .with_resource_patterns(["^ubuntu-"])
///     .with_namespaces(["default"]);
///
/// assert!(rule.has_verb(&Verb::Launch));
/// assert!(rule.matches_resource_name("ubuntu-xfce"));
/// assert!(!rule.has_namespace("kube-system"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// The actions this rule applies for. [`Verb::All`] matches all actions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verbs: Vec<Verb>,

    /// Resource types this rule applies to. [`Resource::All`] matches all types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<Resource>,

    /// Regular expressions matched against resource names (template, role,
    /// or user names). There is no wildcard literal; `.*` has that effect.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resource_patterns: Vec<String>,

    /// Namespaces this rule applies to. Only evaluated for template launches.
    /// `"*"` matches every namespace.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<String>,
}

impl Rule {
    /// Create a new empty rule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the verbs of this rule.
    pub fn with_verbs<I>(mut self, verbs: I) -> Self
    where
        I: IntoIterator<Item = Verb>,
    {
        self.verbs = verbs.into_iter().collect();
        self
    }

    /// Set the resource types of this rule.
    pub fn with_resources<I>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = Resource>,
    {
        self.resources = resources.into_iter().collect();
        self
    }

    /// Set the resource name patterns of this rule.
    pub fn with_resource_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resource_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the namespaces of this rule.
    pub fn with_namespaces<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespaces = namespaces.into_iter().map(Into::into).collect();
        self
    }

    /// Check if this rule is empty.
    ///
    /// An empty rule is well-formed but authorizes nothing.
    ///
    /// # Returns
    ///
    /// `true` if all four fields have no entries
    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
            && self.resources.is_empty()
            && self.resource_patterns.is_empty()
            && self.namespaces.is_empty()
    }

    /// Check if this rule contains the given verb.
    ///
    /// The wildcard verb anywhere in the list matches every verb,
    /// including unrecognized literals.
    pub fn has_verb(&self, verb: &Verb) -> bool {
        self.verbs.iter().any(|item| item.is_wildcard() || item == verb)
    }

    /// Check if this rule contains the given resource type.
    ///
    /// Same wildcard-or-exact semantics as [`Rule::has_verb`].
    pub fn has_resource_type(&self, resource: &Resource) -> bool {
        self.resources
            .iter()
            .any(|item| item.is_wildcard() || item == resource)
    }

    /// Check if this rule includes the given namespace.
    ///
    /// `"*"` anywhere in the list matches every namespace.
    pub fn has_namespace(&self, namespace: &str) -> bool {
        self.namespaces
            .iter()
            .any(|item| item == NAMESPACE_ALL || item == namespace)
    }

    /// Check if any of the resource patterns match the given name.
    ///
    /// Patterns are tried in order and compiled on every call. A pattern
    /// that fails to compile is skipped. With no patterns, or no match,
    /// this returns `false`.
    ///
    /// # Example
    ///
    /// ```
    /// use kvdi_rbac::Rule;
    ///
    /// let rule = Rule::new().with_resource_patterns(["(unclosed", "^ok$"]);
    /// assert!(rule.matches_resource_name("ok"));
    /// assert!(!rule.matches_resource_name("anything-else"));
    /// ```
    pub fn matches_resource_name(&self, name: &str) -> bool {
        self.resource_patterns
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .any(|re| re.is_match(name))
    }

    /// Check if the provided rule matches this one exactly.
    ///
    /// Each field is compared on its string form after sorting a copy, so
    /// ordering does not matter but duplicates do: `[read, read]` is not
    /// equal to `[read]`. Patterns are compared as raw strings, never by
    /// what they match. Neither rule is modified.
    pub fn deep_equal(&self, other: &Rule) -> bool {
        sorted(self.verbs.iter().map(Verb::as_str)) == sorted(other.verbs.iter().map(Verb::as_str))
            && sorted(self.resources.iter().map(Resource::as_str))
                == sorted(other.resources.iter().map(Resource::as_str))
            && sorted(self.resource_patterns.iter().map(String::as_str))
                == sorted(other.resource_patterns.iter().map(String::as_str))
            && sorted(self.namespaces.iter().map(String::as_str))
                == sorted(other.namespaces.iter().map(String::as_str))
    }

    /// Collect authoring problems in this rule.
    ///
    /// Independent of matching: reports what evaluation silently tolerates.
    pub fn validate(&self) -> Vec<RuleDiagnostic> {
        let mut diagnostics = Vec::new();

        for verb in self.verbs.iter().filter(|v| !v.is_known()) {
            diagnostics.push(RuleDiagnostic::UnknownVerb(verb.as_str().to_string()));
        }

        for resource in self.resources.iter().filter(|r| !r.is_known()) {
            diagnostics.push(RuleDiagnostic::UnknownResource(
                resource.as_str().to_string(),
            ));
        }

        for (index, pattern) in self.resource_patterns.iter().enumerate() {
            if let Err(e) = Regex::new(pattern) {
                diagnostics.push(RuleDiagnostic::InvalidPattern {
                    index,
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                });
            }
        }

        if self.resources.contains(&Resource::ServiceAccounts) {
            for verb in &self.verbs {
                if *verb != Verb::Use && !verb.is_wildcard() {
                    diagnostics.push(RuleDiagnostic::VerbIgnoredForServiceAccounts(verb.clone()));
                }
            }
        }

        diagnostics
    }

    /// Check if [`Rule::validate`] finds nothing to report.
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

fn sorted<'a, I>(items: I) -> Vec<&'a str>
where
    I: Iterator<Item = &'a str>,
{
    let mut items: Vec<&str> = items.collect();
    items.sort_unstable();
    items
}

/// A problem found in a rule definition by [`Rule::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleDiagnostic {
    /// A resource pattern that does not compile as a regular expression
    #[error("resource pattern {index} ({pattern:?}) is not a valid regex: {reason}")]
    InvalidPattern {
        /// Position in `resource_patterns`.
        index: usize,
        /// The raw pattern.
        pattern: String,
        /// Compiler message.
        reason: String,
    },

    /// A verb literal that is not recognized
    #[error("unknown verb {0:?}")]
    UnknownVerb(String),

    /// A resource literal that is not recognized
    #[error("unknown resource {0:?}")]
    UnknownResource(String),

    /// A verb listed alongside serviceaccounts that is never evaluated for them
    #[error("verb \"{0}\" has no effect on serviceaccounts, only \"use\" is evaluated")]
    VerbIgnoredForServiceAccounts(Verb),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template_rule() -> Rule {
        Rule::new()
            .with_verbs([Verb::Read, Verb::Launch])
            .with_resources([Resource::Templates])
            .with_resource_patterns(["^foo-"])
            .with_namespaces(["default", "team-a"])
    }

    #[test]
    fn test_empty_rule() {
        let rule = Rule::new();
        assert!(rule.is_empty());
        assert!(!rule.has_verb(&Verb::Read));
        assert!(!rule.has_resource_type(&Resource::Users));
        assert!(!rule.has_namespace("default"));
        assert!(!rule.matches_resource_name(""));
        assert!(!rule.matches_resource_name("anything"));
    }

    #[test]
    fn test_is_empty_per_field() {
        assert!(!Rule::new().with_verbs([Verb::Read]).is_empty());
        assert!(!Rule::new().with_resources([Resource::Users]).is_empty());
        assert!(!Rule::new().with_resource_patterns([".*"]).is_empty());
        assert!(!Rule::new().with_namespaces(["default"]).is_empty());
    }

    #[test]
    fn test_has_verb() {
        let rule = template_rule();
        assert!(rule.has_verb(&Verb::Read));
        assert!(rule.has_verb(&Verb::Launch));
        assert!(!rule.has_verb(&Verb::Delete));
        assert!(!rule.has_verb(&Verb::All));
    }

    #[test]
    fn test_wildcard_verb_matches_everything() {
        let rule = Rule::new().with_verbs([Verb::Read, Verb::All]);
        for verb in Verb::all() {
            assert!(rule.has_verb(&verb));
        }
        assert!(rule.has_verb(&Verb::from("impersonate")));
    }

    #[test]
    fn test_wildcard_resource_matches_everything() {
        let rule = Rule::new().with_resources([Resource::All]);
        for resource in Resource::all() {
            assert!(rule.has_resource_type(&resource));
        }
        assert!(rule.has_resource_type(&Resource::from("secrets")));
    }

    #[test]
    fn test_non_canonical_literals_match_like_canonical_ones() {
        let raw = Rule::new()
            .with_verbs([Verb::Other("*".to_string())])
            .with_resources([Resource::Other("*".to_string())]);
        let canonical = Rule::new()
            .with_verbs([Verb::All])
            .with_resources([Resource::All]);
        let json = serde_json::to_string(&raw).unwrap();
        let reloaded: Rule = serde_json::from_str(&json).unwrap();

        assert!(raw.deep_equal(&canonical));
        for rule in [&raw, &canonical, &reloaded] {
            assert!(rule.has_verb(&Verb::Read));
            assert!(rule.has_resource_type(&Resource::Users));
        }

        let exact = Rule::new()
            .with_verbs([Verb::Other("read".to_string())])
            .with_resources([Resource::Other("users".to_string())]);
        assert!(exact.has_verb(&Verb::Read));
        assert!(exact.has_resource_type(&Resource::Users));
        assert!(exact.deep_equal(
            &Rule::new()
                .with_verbs([Verb::Read])
                .with_resources([Resource::Users])
        ));
        assert!(exact.is_valid());
    }

    #[test]
    fn test_unknown_literal_matches_itself() {
        let rule = Rule::new().with_verbs([Verb::from("patch")]);
        assert!(rule.has_verb(&Verb::Other("patch".to_string())));
        assert!(!rule.has_verb(&Verb::Update));
    }

    #[test]
    fn test_has_namespace() {
        let rule = template_rule();
        assert!(rule.has_namespace("default"));
        assert!(rule.has_namespace("team-a"));
        assert!(!rule.has_namespace("team-b"));

        let any = Rule::new().with_namespaces(["team-a", "*"]);
        assert!(any.has_namespace("team-b"));
        assert!(any.has_namespace(""));
    }

    #[test]
    fn test_matches_resource_name() {
        let rule = template_rule();
        assert!(rule.matches_resource_name("foo-bar"));
        assert!(!rule.matches_resource_name("bar-foo"));
    }

    #[test]
    fn test_matches_resource_name_is_unanchored() {
        let rule = Rule::new().with_resource_patterns(["admin"]);
        assert!(rule.matches_resource_name("super-admin-user"));
    }

    #[test]
    fn test_invalid_pattern_is_skipped() {
        let rule = Rule::new().with_resource_patterns(["(unclosed", "^ok$"]);
        assert!(rule.matches_resource_name("ok"));
        assert!(!rule.matches_resource_name("anything-else"));

        let only_invalid = Rule::new().with_resource_patterns(["[z-a]"]);
        assert!(!only_invalid.matches_resource_name("z"));
    }

    #[test]
    fn test_deep_equal_reflexive() {
        let rule = template_rule();
        assert!(rule.deep_equal(&rule));
        assert!(Rule::new().deep_equal(&Rule::new()));
    }

    #[test]
    fn test_deep_equal_ignores_order() {
        let a = template_rule();
        let b = Rule::new()
            .with_verbs([Verb::Launch, Verb::Read])
            .with_resources([Resource::Templates])
            .with_resource_patterns(["^foo-"])
            .with_namespaces(["team-a", "default"]);
        assert!(a.deep_equal(&b));
        assert!(b.deep_equal(&a));
    }

    #[test]
    fn test_deep_equal_does_not_reorder_inputs() {
        let rule = Rule::new().with_namespaces(["zeta", "alpha"]);
        let other = Rule::new().with_namespaces(["alpha", "zeta"]);
        assert!(rule.deep_equal(&other));
        assert_eq!(rule.namespaces, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_deep_equal_is_duplicate_sensitive() {
        let a = Rule::new().with_verbs([Verb::Read, Verb::Read]);
        let b = Rule::new().with_verbs([Verb::Read]);
        assert!(!a.deep_equal(&b));
    }

    #[test]
    fn test_deep_equal_compares_pattern_strings() {
        // Both match exactly the same names, but are written differently.
        let a = Rule::new().with_resource_patterns(["^a$"]);
        let b = Rule::new().with_resource_patterns(["^(a)$"]);
        assert!(a.matches_resource_name("a") && b.matches_resource_name("a"));
        assert!(!a.deep_equal(&b));

        let a = Rule::new().with_resource_patterns(["a"]);
        let b = Rule::new().with_resource_patterns(["b"]);
        assert!(!a.deep_equal(&b));
    }

    #[test]
    fn test_deep_equal_wildcard_is_literal() {
        let wildcard = Rule::new().with_verbs([Verb::All]);
        let explicit = Rule::new().with_verbs(Verb::all());
        assert!(!wildcard.deep_equal(&explicit));
        assert!(wildcard.deep_equal(&Rule::new().with_verbs([Verb::from("*")])));
    }

    #[test]
    fn test_deserialize_absent_fields() {
        let rule: Rule = serde_json::from_str(r#"{"verbs":["read"]}"#).unwrap();
        assert_eq!(rule.verbs, vec![Verb::Read]);
        assert!(rule.resources.is_empty());
        assert!(rule.resource_patterns.is_empty());
        assert!(rule.namespaces.is_empty());

        let empty: Rule = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_serialize_field_names() {
        let json = serde_json::to_value(template_rule()).unwrap();
        assert_eq!(json["resourcePatterns"], serde_json::json!(["^foo-"]));
        assert_eq!(json["namespaces"], serde_json::json!(["default", "team-a"]));

        let json = serde_json::to_string(&Rule::new()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_validate() {
        assert!(template_rule().is_valid());

        let rule = Rule::new()
            .with_verbs([Verb::Use, Verb::Read, Verb::from("patch")])
            .with_resources([Resource::ServiceAccounts, Resource::from("pods")])
            .with_resource_patterns(["^ok$", "(unclosed"]);
        let diagnostics = rule.validate();

        assert!(diagnostics.contains(&RuleDiagnostic::UnknownVerb("patch".to_string())));
        assert!(diagnostics.contains(&RuleDiagnostic::UnknownResource("pods".to_string())));
        assert!(diagnostics.contains(&RuleDiagnostic::VerbIgnoredForServiceAccounts(Verb::Read)));
        assert!(!diagnostics.contains(&RuleDiagnostic::VerbIgnoredForServiceAccounts(Verb::Use)));
        assert!(diagnostics.iter().any(|d| matches!(
            d,
            RuleDiagnostic::InvalidPattern { index: 1, pattern, .. } if pattern == "(unclosed"
        )));

        // Validation never changes matching.
        assert!(rule.matches_resource_name("ok"));
    }
}
