//! Error types for parsing and loading access control definitions
//!
//! Rule evaluation itself is total and never produces these errors. They
//! only come out of loading role documents or parsing capability names.

use thiserror::Error;

/// RBAC error types.
#[derive(Debug, Error)]
pub enum RbacError {
    /// A capability name that is not in the grant table
    #[error("Unknown grant: {0}")]
    UnknownGrant(String),

    /// A verb literal that is not recognized
    #[error("Unknown verb: {0}")]
    UnknownVerb(String),

    /// A resource literal that is not recognized
    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    /// A role document could not be deserialized
    #[error("Invalid role definition: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// Result type for RBAC loading operations.
pub type RbacResult<T> = Result<T, RbacError>;
