//! Bearer session tokens.

use crate::AuthError;
use maison_commerce::ids::UserId;
use serde::{Deserialize, Serialize};

/// Default session lifetime: 7 days.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Length of a token string (24 random bytes, base64url without padding).
const TOKEN_LENGTH: usize = 32;

/// A bearer session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthToken {
    /// The token value.
    pub token: String,
    /// User ID this token belongs to.
    pub user_id: UserId,
    /// Unix timestamp when token was created.
    pub created_at: i64,
    /// Unix timestamp when token expires.
    pub expires_at: i64,
}

impl AuthToken {
    /// Issue a new token for `user_id` valid for `ttl_secs` from `now`.
    pub fn issue(user_id: UserId, ttl_secs: i64, now: i64) -> Self {
        Self {
            token: generate_token_string(),
            user_id,
            created_at: now,
            expires_at: now.saturating_add(ttl_secs.max(1)),
        }
    }

    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    /// Validate the token against the clock.
    pub fn validate(&self, now: i64) -> Result<(), AuthError> {
        if !Self::is_well_formed(&self.token) {
            return Err(AuthError::InvalidToken);
        }
        if self.is_expired(now) {
            return Err(AuthError::TokenExpired);
        }
        Ok(())
    }

    /// Time until expiration in seconds.
    pub fn time_to_expiry(&self, now: i64) -> i64 {
        (self.expires_at - now).max(0)
    }

    /// Cheap shape check before touching the session store.
    pub fn is_well_formed(token: &str) -> bool {
        token.len() == TOKEN_LENGTH
            && token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    /// Extract the token from an `Authorization: Bearer <token>` header value.
    pub fn from_bearer_header(value: &str) -> Result<&str, AuthError> {
        let token = value
            .strip_prefix("Bearer ")
            .or_else(|| value.strip_prefix("bearer "))
            .map(str::trim)
            .ok_or(AuthError::InvalidToken)?;
        if Self::is_well_formed(token) {
            Ok(token)
        } else {
            Err(AuthError::InvalidToken)
        }
    }
}

/// Generate a cryptographically secure token string.
fn generate_token_string() -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use rand::Rng;

    let bytes: [u8; 24] = rand::thread_rng().gen();
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_generation() {
        let token = AuthToken::issue(UserId::new("user_123"), 60, 1_000);
        assert_eq!(token.token.len(), 32);
        assert_eq!(token.expires_at, 1_060);
        assert!(token.validate(1_000).is_ok());
        assert!(AuthToken::is_well_formed(&token.token));
    }

    #[test]
    fn test_token_expiry() {
        let token = AuthToken::issue(UserId::new("user_1"), 60, 1_000);
        assert!(!token.is_expired(1_059));
        assert!(matches!(token.validate(1_060), Err(AuthError::TokenExpired)));
        assert_eq!(token.time_to_expiry(2_000), 0);
    }

    #[test]
    fn test_rapid_token_generation_uniqueness() {
        let tokens: std::collections::HashSet<String> = (0..100)
            .map(|_| AuthToken::issue(UserId::new("user_1"), 60, 0).token)
            .collect();
        assert_eq!(tokens.len(), 100);
    }

    #[test]
    fn test_bearer_header_parsing() {
        let token = AuthToken::issue(UserId::new("u"), 60, 0);
        let header = format!("Bearer {}", token.token);
        assert_eq!(AuthToken::from_bearer_header(&header).unwrap(), token.token);

        assert!(AuthToken::from_bearer_header(&token.token).is_err());
        assert!(AuthToken::from_bearer_header("Bearer short").is_err());
        assert!(AuthToken::from_bearer_header("Basic abc").is_err());
    }
}
