//! User types.

use crate::AuthError;
use maison_commerce::engagement::normalize_email;
use maison_commerce::ids::UserId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Maximum display name length in characters.
const MAX_NAME_LENGTH: usize = 100;

/// User role for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Storefront customer.
    #[default]
    Customer,
    /// Back-office administrator.
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
        }
    }

    /// Check if this role has at least the given permission level.
    pub fn has_permission(&self, required: Role) -> bool {
        self.level() >= required.level()
    }

    /// Get permission level (higher = more permissions).
    pub fn level(&self) -> u8 {
        match self {
            Role::Customer => 0,
            Role::Admin => 1,
        }
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Role::Customer),
            "admin" => Ok(Role::Admin),
            other => Err(AuthError::Validation(format!("unknown role: {other}"))),
        }
    }
}

/// An authenticated account, as exposed to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    /// Normalized (trimmed, lower-case) email.
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub created_at: i64,
}

impl User {
    /// Require at least `role`.
    pub fn require(&self, role: Role) -> Result<(), AuthError> {
        if self.role.has_permission(role) {
            Ok(())
        } else {
            Err(AuthError::InsufficientPermissions)
        }
    }

    /// Name if set, otherwise the email address.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.email.as_str())
    }
}

/// A user together with the stored password hash.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

impl UserCredentials {
    /// Build credentials for a new account.
    ///
    /// Normalizes the email, trims the name, checks password strength,
    /// and hashes the password.
    pub fn register(
        email: &str,
        name: Option<&str>,
        password: &str,
        role: Role,
        now: i64,
    ) -> Result<Self, AuthError> {
        let email =
            normalize_email(email).map_err(|_| AuthError::Validation("invalid email address".into()))?;
        let name = name.map(str::trim).filter(|n| !n.is_empty());
        if name.is_some_and(|n| n.chars().count() > MAX_NAME_LENGTH) {
            return Err(AuthError::Validation(format!(
                "name must be at most {MAX_NAME_LENGTH} characters"
            )));
        }
        crate::PasswordHasher::validate_password(password)?;
        let password_hash = crate::PasswordHasher::new().hash(password)?;

        Ok(Self {
            user: User {
                id: UserId::generate(),
                email,
                name: name.map(str::to_string),
                role,
                created_at: now,
            },
            password_hash,
        })
    }

    /// Check a login attempt against the stored hash.
    pub fn verify(&self, password: &str) -> Result<(), AuthError> {
        if crate::PasswordHasher::new().verify(password, &self.password_hash)? {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_permissions() {
        assert!(Role::Admin.has_permission(Role::Customer));
        assert!(Role::Admin.has_permission(Role::Admin));
        assert!(!Role::Customer.has_permission(Role::Admin));
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_register_and_verify() {
        let creds =
            UserCredentials::register(" Asha@Example.com ", Some(" Asha "), "Secret123", Role::Customer, 10)
                .unwrap();
        assert_eq!(creds.user.email, "asha@example.com");
        assert_eq!(creds.user.display_name(), "Asha");
        assert!(creds.verify("Secret123").is_ok());
        assert!(matches!(
            creds.verify("Secret124"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_register_rejects_weak_password() {
        let err = UserCredentials::register("a@b.co", None, "password", Role::Customer, 0)
            .unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword(_)));
    }

    #[test]
    fn test_require_admin() {
        let user = User {
            id: UserId::new("u"),
            email: "u@example.com".into(),
            name: None,
            role: Role::Customer,
            created_at: 0,
        };
        assert!(user.require(Role::Customer).is_ok());
        assert!(user.require(Role::Admin).unwrap_err().is_permission_error());
        assert_eq!(user.display_name(), "u@example.com");
    }
}
