//! Authentication errors.

use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Invalid credentials provided.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// User already exists.
    #[error("an account already exists for {0}")]
    UserAlreadyExists(String),

    /// Session not found or revoked.
    #[error("session not found")]
    SessionNotFound,

    /// Malformed or missing bearer token.
    #[error("token invalid")]
    InvalidToken,

    #[error("token expired")]
    TokenExpired,

    /// Password too weak.
    #[error("password too weak: {0}")]
    WeakPassword(String),

    /// Malformed registration input.
    #[error("{0}")]
    Validation(String),

    /// Insufficient permissions.
    #[error("insufficient permissions")]
    InsufficientPermissions,

    /// Password hashing failed or a stored hash is unreadable.
    #[error("password hash error: {0}")]
    Hash(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Check if this is an authentication failure (HTTP 401).
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials
                | AuthError::SessionNotFound
                | AuthError::InvalidToken
                | AuthError::TokenExpired
        )
    }

    /// Check if this is a permission error (HTTP 403).
    pub fn is_permission_error(&self) -> bool {
        matches!(self, AuthError::InsufficientPermissions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        assert!(AuthError::TokenExpired.is_auth_failure());
        assert!(AuthError::InvalidCredentials.is_auth_failure());
        assert!(!AuthError::WeakPassword("x".into()).is_auth_failure());
        assert!(AuthError::InsufficientPermissions.is_permission_error());
    }
}
