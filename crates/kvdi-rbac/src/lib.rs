//! # kvdi RBAC
//!
//! This crate is the authorization engine behind kvdi: given the rules of
//! every role bound to a principal, decide whether an action is permitted.
//!
//! ## Overview
//!
//! The kvdi-rbac crate handles:
//! - **Verbs**: Actions a rule may permit (`create`, `read`, `update`,
//!   `delete`, `use`, `launch`, `*`)
//! - **Resources**: Resource types a rule applies to (`users`, `roles`,
//!   `templates`, `serviceaccounts`, `*`)
//! - **Rules**: Verbs + resources + name patterns + namespaces
//! - **Rule Sets**: The union of rules across roles, and the authorization decision
//! - **Grants**: A coarse capability bitmask gating API operations
//! - **Roles**: Named rules and grants, loadable from JSON
//!
//! ## Architecture
//!
//! ```text
//! Role ─┬─ rules ──→ RuleSet (union) ──→ authorizes(AccessRequest)
//!       └─ grants ─→ Grant   (OR)    ──→ has(Grant)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use kvdi_rbac::{AccessRequest, Grant, Resource, Role, Rule, Verb};
//! use kvdi_rbac::roles::{aggregate_grants, aggregate_rules};
//!
//! let roles = vec![
//!     Role::new("launcher")
//!         .with_rule(
//!             Rule::new()
//!                 .with_verbs([Verb::Read, Verb::Launch])
//!                 .with_resources([Resource::Templates])
//!                 .with_resource_patterns(["^ubuntu-"])
//!                 .with_namespaces(["team-a"]),
//!         )
//!         .with_grants(Grant::READ_TEMPLATES | Grant::LAUNCH_TEMPLATES),
//! ];
//!
//! let rules = aggregate_rules(&roles, true);
//! assert!(rules.authorizes(&AccessRequest::launch_template("ubuntu-xfce", "team-a")));
//! assert!(!rules.authorizes(&AccessRequest::launch_template("ubuntu-xfce", "team-b")));
//!
//! let grants = aggregate_grants(&roles);
//! assert!(grants.has(Grant::LAUNCH_TEMPLATES));
//! ```
//!
//! ## Matching Semantics
//!
//! - Verbs and resource types are mandatory: an empty list matches nothing
//! - Resource patterns and namespaces only narrow a rule when non-empty
//! - Invalid resource patterns are skipped during evaluation; see [`Rule::validate`]
//! - [`Rule::deep_equal`] ignores ordering but not duplicates

pub mod error;
pub mod grants;
pub mod resources;
pub mod roles;
pub mod rule_set;
pub mod rules;
pub mod verbs;

// Re-export main types for convenience
pub use error::{RbacError, RbacResult};
pub use grants::Grant;
pub use resources::{Resource, NAMESPACE_ALL};
pub use roles::Role;
pub use rule_set::{AccessRequest, CompiledRuleSet, RuleSet};
pub use rules::{Rule, RuleDiagnostic};
pub use verbs::Verb;
