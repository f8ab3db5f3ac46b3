//! # kvdi Authorization Gate
//!
//! This crate is the boundary between API handlers and the kvdi-rbac
//! engine. It resolves the roles bound to a caller, aggregates them into a
//! session, and turns "not allowed" into a distinguishable forbidden error.
//!
//! ## Overview
//!
//! The kvdi-auth crate handles:
//! - **Resolution**: Looking up role bindings through a [`RoleResolver`]
//! - **Sessions**: The union of rules and grants for one user
//! - **Gating**: Grant checks for coarse API operations, rule checks for
//!   named templates, users, roles, and service accounts
//! - **Errors**: [`AuthError::Forbidden`] for denials, mapped to HTTP 403
//!
//! ## Usage
//!
//! ```rust,no_run
//! use kvdi_auth::{AccessGate, StaticRoleResolver};
//! use kvdi_rbac::{AccessRequest, Grant, Resource, Role, Rule, Verb};
//!
//! # async fn example() -> kvdi_auth::AuthResult<()> {
//! let launcher = Role::new("launcher")
//!     .with_rule(
//!         Rule::new()
//!             .with_verbs([Verb::Launch])
//!             .with_resources([Resource::Templates])
//!             .with_namespaces(["team-a"]),
//!     )
//!     .with_grants(Grant::LAUNCH_TEMPLATES);
//!
//! let resolver = StaticRoleResolver::new()
//!     .with_role(launcher)
//!     .bind("alice", "launcher");
//! let gate = AccessGate::new(resolver);
//!
//! // Coarse API gating
//! gate.require_grant("alice", Grant::LAUNCH_TEMPLATES).await?;
//!
//! // Fine-grained rule check
//! let request = AccessRequest::launch_template("ubuntu-xfce", "team-a");
//! gate.authorize("alice", &request).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod gate;
pub mod resolver;
pub mod session;

// Re-export main types
pub use error::{AuthError, AuthResult};
pub use gate::{AccessGate, GateConfig};
pub use resolver::{RoleResolver, StaticRoleResolver};
pub use session::UserSession;
