//! Authentication module for Maison.
//!
//! Provides users and roles, password hashing, and bearer session tokens.

mod error;
mod password;
mod token;
mod user;

pub use error::AuthError;
pub use password::PasswordHasher;
pub use token::{AuthToken, DEFAULT_SESSION_TTL_SECS};
pub use user::{Role, User, UserCredentials};
