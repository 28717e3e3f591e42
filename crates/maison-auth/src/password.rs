//! Password hashing.
//!
//! Hashes are Argon2id PHC strings (`$argon2id$v=19$...`) with a random
//! per-password salt.

use crate::AuthError;
use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
};
use argon2::Argon2;

/// Minimum password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Password hasher using Argon2 default parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    pub fn new() -> Self {
        Self
    }

    /// Hash a password into a PHC string.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Hash(e.to_string()))
    }

    /// Verify a password against a stored PHC string.
    ///
    /// A wrong password is `Ok(false)`; an unreadable hash is an error.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|e| AuthError::Hash(e.to_string()))?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Hash(e.to_string())),
        }
    }

    /// Validate password strength.
    pub fn validate_password(password: &str) -> Result<(), AuthError> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        let has_upper = password.chars().any(|c| c.is_uppercase());
        let has_lower = password.chars().any(|c| c.is_lowercase());
        let has_digit = password.chars().any(|c| c.is_ascii_digit());

        if !has_upper || !has_lower || !has_digit {
            return Err(AuthError::WeakPassword(
                "password must contain uppercase, lowercase, and numbers".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("SecurePass123").unwrap();
        assert!(hash.starts_with("$argon2"));

        assert!(hasher.verify("SecurePass123", &hash).unwrap());
        assert!(!hasher.verify("WrongPassword1", &hash).unwrap());
    }

    #[test]
    fn test_different_hashes_for_same_password() {
        let hasher = PasswordHasher::new();
        let hash1 = hasher.hash("TestPassword1").unwrap();
        let hash2 = hasher.hash("TestPassword1").unwrap();
        assert_ne!(hash1, hash2);
        assert!(hasher.verify("TestPassword1", &hash2).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_error() {
        let hasher = PasswordHasher::new();
        assert!(matches!(
            hasher.verify("whatever", "not-a-phc-string"),
            Err(AuthError::Hash(_))
        ));
    }

    #[test]
    fn test_password_validation() {
        assert!(PasswordHasher::validate_password("SecurePass1").is_ok());
        assert!(PasswordHasher::validate_password("Sh0rt").is_err());
        assert!(PasswordHasher::validate_password("alllowercase1").is_err());
        assert!(PasswordHasher::validate_password("ALLUPPERCASE1").is_err());
        assert!(PasswordHasher::validate_password("NoNumbersHere").is_err());
    }
}
