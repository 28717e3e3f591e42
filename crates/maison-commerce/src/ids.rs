//! Newtype IDs for type-safe identifiers.
//!
//! Using newtypes prevents accidentally mixing up different ID types,
//! e.g., passing a ProductId where a VariantId is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($name:ident) => {
        /// A unique identifier.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a new random ID.
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&$name> for maison_db::Value {
            fn from(id: &$name) -> Self {
                maison_db::Value::Text(id.0.clone())
            }
        }

        impl From<$name> for maison_db::Value {
            fn from(id: $name) -> Self {
                maison_db::Value::Text(id.0)
            }
        }
    };
}

define_id!(ProductId);
define_id!(VariantId);
define_id!(CategoryId);
define_id!(OrderId);
define_id!(OrderItemId);
define_id!(PaymentId);
define_id!(AddressId);
define_id!(CouponId);
define_id!(ReviewId);
define_id!(UserId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = ProductId::new("prod-123");
        assert_eq!(id.as_str(), "prod-123");
    }

    #[test]
    fn test_id_generation_is_uuid() {
        let id1 = OrderId::generate();
        let id2 = OrderId::generate();
        assert_ne!(id1, id2);
        assert!(uuid::Uuid::parse_str(id1.as_str()).is_ok());
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = VariantId::new("var-9");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"var-9\"");
    }

    #[test]
    fn test_id_into_db_value() {
        let id = UserId::new("user-1");
        assert_eq!(maison_db::Value::from(&id), maison_db::Value::Text("user-1".into()));
    }
}
