//! Coupon codes.

use crate::error::CommerceError;
use crate::ids::CouponId;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// How a coupon reduces the subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouponKind {
    /// Whole-number percentage off (1-100).
    Percentage,
    /// Fixed amount off, in minor units.
    Fixed,
}

impl CouponKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CouponKind::Percentage => "percentage",
            CouponKind::Fixed => "fixed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "percentage" | "percent" => Some(CouponKind::Percentage),
            "fixed" => Some(CouponKind::Fixed),
            _ => None,
        }
    }
}

/// A discount code customers enter at checkout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coupon {
    /// Unique coupon identifier.
    pub id: CouponId,
    /// Code, always stored upper-case.
    pub code: String,
    /// Description shown to customers.
    pub description: Option<String>,
    /// Discount kind.
    pub kind: CouponKind,
    /// Percentage (1-100) or fixed amount in minor units.
    pub value: i64,
    /// Minimum subtotal before the coupon applies.
    pub min_order: Money,
    /// Cap on the discount for percentage coupons.
    pub max_discount: Option<Money>,
    /// Maximum number of redemptions (None = unlimited).
    pub usage_limit: Option<i64>,
    /// Redemptions so far.
    pub usage_count: i64,
    /// Unix timestamp the coupon becomes valid.
    pub starts_at: Option<i64>,
    /// Unix timestamp the coupon stops being valid.
    pub expires_at: Option<i64>,
    /// Whether the coupon is switched on.
    pub active: bool,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

/// Normalize a user-entered coupon code.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

impl Coupon {
    fn base(code: &str, kind: CouponKind, value: i64, currency: Currency) -> Self {
        let now = crate::current_timestamp();
        Self {
            id: CouponId::generate(),
            code: normalize_code(code),
            description: None,
            kind,
            value,
            min_order: Money::zero(currency),
            max_discount: None,
            usage_limit: None,
            usage_count: 0,
            starts_at: None,
            expires_at: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a percentage coupon.
    pub fn percentage(code: &str, percent: i64, currency: Currency) -> Self {
        Self::base(code, CouponKind::Percentage, percent, currency)
    }

    /// Create a fixed amount coupon.
    pub fn fixed(code: &str, amount: Money) -> Self {
        Self::base(code, CouponKind::Fixed, amount.amount_cents, amount.currency)
    }

    /// Require a minimum subtotal.
    pub fn with_min_order(mut self, min_order: Money) -> Self {
        self.min_order = min_order;
        self
    }

    /// Cap the discount amount.
    pub fn with_max_discount(mut self, max: Money) -> Self {
        self.max_discount = Some(max);
        self
    }

    /// Add a usage limit.
    pub fn with_usage_limit(mut self, limit: i64) -> Self {
        self.usage_limit = Some(limit);
        self
    }

    /// Set the validity window.
    pub fn with_window(mut self, starts_at: Option<i64>, expires_at: Option<i64>) -> Self {
        self.starts_at = starts_at;
        self.expires_at = expires_at;
        self
    }

    /// Check the definition an admin submitted.
    pub fn validate_definition(&self) -> Result<(), CommerceError> {
        let code_ok = (3..=32).contains(&self.code.len())
            && self
                .code
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '_');
        if !code_ok {
            return Err(CommerceError::validation(
                "coupon code must be 3-32 characters of A-Z, 0-9, '-' or '_'",
            ));
        }
        match self.kind {
            CouponKind::Percentage if !(1..=100).contains(&self.value) => {
                return Err(CommerceError::validation(
                    "percentage must be between 1 and 100",
                ));
            }
            CouponKind::Fixed if self.value <= 0 => {
                return Err(CommerceError::validation("fixed discount must be positive"));
            }
            _ => {}
        }
        if self.min_order.is_negative() {
            return Err(CommerceError::validation("minimum order cannot be negative"));
        }
        if self.max_discount.is_some_and(|m| !m.is_positive()) {
            return Err(CommerceError::validation("maximum discount must be positive"));
        }
        if self.usage_limit.is_some_and(|l| l <= 0) {
            return Err(CommerceError::validation("usage limit must be positive"));
        }
        if let (Some(start), Some(end)) = (self.starts_at, self.expires_at) {
            if end <= start {
                return Err(CommerceError::validation("coupon must expire after it starts"));
            }
        }
        Ok(())
    }

    /// Check if the coupon has run out of redemptions.
    pub fn is_exhausted(&self) -> bool {
        self.usage_limit
            .map(|limit| self.usage_count >= limit)
            .unwrap_or(false)
    }

    /// Check if the coupon has expired at `now`.
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at.map(|ends| now > ends).unwrap_or(false)
    }

    /// Check that the coupon can be applied to `subtotal` at `now`.
    pub fn validate(&self, subtotal: &Money, now: i64) -> Result<(), CommerceError> {
        if !self.active {
            return Err(CommerceError::CouponInactive(self.code.clone()));
        }
        if self.starts_at.is_some_and(|starts| now < starts) {
            return Err(CommerceError::CouponNotStarted(self.code.clone()));
        }
        if self.is_expired(now) {
            return Err(CommerceError::CouponExpired(self.code.clone()));
        }
        if self.is_exhausted() {
            return Err(CommerceError::CouponExhausted(self.code.clone()));
        }
        if subtotal.currency != self.min_order.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.min_order.currency.code().to_string(),
                got: subtotal.currency.code().to_string(),
            });
        }
        if subtotal.amount_cents < self.min_order.amount_cents {
            return Err(CommerceError::CouponMinimumNotMet {
                code: self.code.clone(),
                required: self.min_order,
            });
        }
        Ok(())
    }

    /// Discount this coupon gives on `subtotal`, never more than the subtotal.
    pub fn discount_for(&self, subtotal: &Money) -> Result<Money, CommerceError> {
        let raw = match self.kind {
            CouponKind::Percentage => {
                let discount = subtotal.percentage(self.value)?;
                match self.max_discount {
                    Some(cap) => discount.min(cap)?,
                    None => discount,
                }
            }
            CouponKind::Fixed => Money::new(self.value, subtotal.currency),
        };
        let capped = raw.min(*subtotal)?;
        Ok(Money::new(capped.amount_cents.max(0), subtotal.currency))
    }

    /// Validate against `subtotal` and return the discount.
    pub fn apply(&self, subtotal: &Money, now: i64) -> Result<Money, CommerceError> {
        self.validate(subtotal, now)?;
        self.discount_for(subtotal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inr(cents: i64) -> Money {
        Money::new(cents, Currency::INR)
    }

    #[test]
    fn test_code_is_upper_cased() {
        let coupon = Coupon::percentage(" save10 ", 10, Currency::INR);
        assert_eq!(coupon.code, "SAVE10");
        assert!(coupon.validate_definition().is_ok());
    }

    #[test]
    fn test_percentage_discount() {
        let coupon = Coupon::percentage("SAVE10", 10, Currency::INR);
        assert_eq!(coupon.discount_for(&inr(10_000)).unwrap(), inr(1_000));
        assert_eq!(coupon.discount_for(&inr(999)).unwrap(), inr(99));
    }

    #[test]
    fn test_percentage_discount_capped() {
        let coupon = Coupon::percentage("BIG50", 50, Currency::INR).with_max_discount(inr(2_000));
        assert_eq!(coupon.discount_for(&inr(10_000)).unwrap(), inr(2_000));
    }

    #[test]
    fn test_fixed_discount_capped_at_subtotal() {
        let coupon = Coupon::fixed("FLAT500", inr(50_000));
        assert_eq!(coupon.discount_for(&inr(30_000)).unwrap(), inr(30_000));
        assert_eq!(coupon.discount_for(&inr(80_000)).unwrap(), inr(50_000));
    }

    #[test]
    fn test_minimum_order() {
        let coupon = Coupon::fixed("FLAT500", inr(50_000)).with_min_order(inr(200_000));
        let err = coupon.validate(&inr(150_000), 0).unwrap_err();
        assert!(matches!(
            err,
            CommerceError::CouponMinimumNotMet { required, .. } if required == inr(200_000)
        ));
        assert!(coupon.validate(&inr(200_000), 0).is_ok());
    }

    #[test]
    fn test_validity_window_and_usage() {
        let mut coupon =
            Coupon::percentage("WINDOW", 5, Currency::INR).with_window(Some(100), Some(200));
        assert!(matches!(
            coupon.validate(&inr(1000), 50),
            Err(CommerceError::CouponNotStarted(_))
        ));
        assert!(coupon.validate(&inr(1000), 150).is_ok());
        assert!(matches!(
            coupon.validate(&inr(1000), 201),
            Err(CommerceError::CouponExpired(_))
        ));

        coupon = coupon.with_usage_limit(2);
        coupon.usage_count = 2;
        assert!(matches!(
            coupon.validate(&inr(1000), 150),
            Err(CommerceError::CouponExhausted(_))
        ));

        coupon.active = false;
        assert!(matches!(
            coupon.validate(&inr(1000), 150),
            Err(CommerceError::CouponInactive(_))
        ));
    }

    #[test]
    fn test_invalid_definitions() {
        assert!(Coupon::percentage("P0", 10, Currency::INR)
            .validate_definition()
            .is_err());
        assert!(Coupon::percentage("OVER", 101, Currency::INR)
            .validate_definition()
            .is_err());
        assert!(Coupon::fixed("ZERO", inr(0)).validate_definition().is_err());
        assert!(Coupon::percentage("BAD CODE", 10, Currency::INR)
            .validate_definition()
            .is_err());
    }
}
