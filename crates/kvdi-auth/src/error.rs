//! Error types for request authorization
//!
//! A denied request is reported as [`AuthError::Forbidden`], which callers
//! translate into a 403 response. The message names only the missing grant
//! or the attempted action, never the rules that were evaluated.

use kvdi_rbac::Grant;
use thiserror::Error;

/// Authorization error types.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No principal could be established for the request
    #[error("Unauthenticated")]
    Unauthenticated,

    /// The principal is not allowed to perform the action
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Role bindings could not be resolved
    #[error("Role resolution failed: {0}")]
    RoleResolution(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for authorization operations.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Forbidden error for a missing API grant.
    ///
    /// # Example
    ///
    /// ```
    /// use kvdi_auth::AuthError;
    /// use kvdi_rbac::Grant;
    ///
    /// let err = AuthError::missing_grant(Grant::READ_DESKTOP_SESSIONS);
    /// assert_eq!(err.to_string(), "Forbidden: User does not have ReadDesktopSessions grant");
    /// ```
    pub fn missing_grant(grant: Grant) -> Self {
        AuthError::Forbidden(format!("User does not have {} grant", grant))
    }

    /// Check if this is an authorization denial.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, AuthError::Forbidden(_))
    }

    /// Check if this error should be logged at error level.
    ///
    /// Denials are expected outcomes and are not server errors.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            AuthError::RoleResolution(_) | AuthError::ConfigError(_) | AuthError::Internal(_)
        )
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::Unauthenticated => 401,
            AuthError::Forbidden(_) => 403,
            AuthError::RoleResolution(_) | AuthError::ConfigError(_) | AuthError::Internal(_) => {
                500
            }
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::Unauthenticated => "UNAUTHENTICATED",
            AuthError::Forbidden(_) => "FORBIDDEN",
            AuthError::RoleResolution(_) => "ROLE_RESOLUTION_ERROR",
            AuthError::ConfigError(_) => "CONFIG_ERROR",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::Unauthenticated.status_code(), 401);
        assert_eq!(AuthError::Forbidden("no".into()).status_code(), 403);
        assert_eq!(AuthError::RoleResolution("down".into()).status_code(), 500);
        assert_eq!(AuthError::Internal("oops".into()).status_code(), 500);
    }

    #[test]
    fn test_forbidden_is_distinguishable() {
        let err = AuthError::missing_grant(Grant::WRITE_ROLES);
        assert!(err.is_forbidden());
        assert!(!err.is_server_error());
        assert_eq!(err.error_code(), "FORBIDDEN");
        assert!(!AuthError::Internal("x".into()).is_forbidden());
    }
}
