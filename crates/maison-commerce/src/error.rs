//! Commerce error types.

use crate::money::Money;
use thiserror::Error;

/// Errors that can occur in storefront operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Variant not found.
    #[error("Variant not found: {0}")]
    VariantNotFound(String),

    /// Category not found.
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Item not in cart.
    #[error("Item not in cart: {0}")]
    ItemNotInCart(String),

    /// Not enough stock to satisfy the request.
    #[error("Insufficient stock for {variant_id}: requested {requested}, available {available}")]
    InsufficientStock {
        variant_id: String,
        requested: i64,
        available: i64,
    },

    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Quantity exceeds maximum allowed.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, i64),

    /// The order cannot move between these statuses.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    /// Unknown coupon code.
    #[error("Invalid coupon code: {0}")]
    InvalidCoupon(String),

    /// Coupon switched off by an admin.
    #[error("Coupon is not active: {0}")]
    CouponInactive(String),

    /// Coupon start date is in the future.
    #[error("Coupon is not valid yet: {0}")]
    CouponNotStarted(String),

    /// Coupon past its expiry date.
    #[error("Coupon expired: {0}")]
    CouponExpired(String),

    /// Coupon usage limit reached.
    #[error("Coupon usage limit reached: {0}")]
    CouponExhausted(String),

    /// Subtotal is below the coupon threshold.
    #[error("Coupon {code} requires a minimum order of {required}")]
    CouponMinimumNotMet { code: String, required: Money },

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// A gateway signature did not match.
    #[error("Payment signature mismatch")]
    InvalidSignature,

    /// Database error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl CommerceError {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        CommerceError::ValidationError(message.into())
    }

    /// Check if this error means a referenced record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CommerceError::ProductNotFound(_)
                | CommerceError::VariantNotFound(_)
                | CommerceError::CategoryNotFound(_)
                | CommerceError::OrderNotFound(_)
                | CommerceError::ItemNotInCart(_)
        )
    }
}

impl From<maison_db::DbError> for CommerceError {
    fn from(e: maison_db::DbError) -> Self {
        CommerceError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::SerializationError(e.to_string())
    }
}
