//! Cart pricing calculations.

use crate::error::CommerceError;
use crate::ids::VariantId;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Complete pricing breakdown for a cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartPricing {
    /// Subtotal before discounts.
    pub subtotal: Money,
    /// Coupon discount.
    pub discount_total: Money,
    /// Shipping cost.
    pub shipping_total: Money,
    /// Final total (subtotal - discount + shipping).
    pub grand_total: Money,
    /// Coupon code that produced the discount.
    pub coupon_code: Option<String>,
    /// Per-line pricing breakdown.
    pub line_items: Vec<LineItemPricing>,
}

/// Pricing breakdown for a single cart line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItemPricing {
    /// Variant on this line.
    pub variant_id: VariantId,
    /// Unit price.
    pub unit_price: Money,
    /// Quantity.
    pub quantity: i64,
    /// unit_price * quantity.
    pub total: Money,
}

/// Flat-rate shipping with an optional free-shipping threshold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ShippingPolicy {
    /// Charged when the threshold isn't met.
    pub flat_rate: Money,
    /// Post-discount subtotal at which shipping becomes free.
    pub free_shipping_threshold: Option<Money>,
}

impl ShippingPolicy {
    pub fn new(flat_rate: Money, free_shipping_threshold: Option<Money>) -> Self {
        Self {
            flat_rate,
            free_shipping_threshold,
        }
    }

    /// Policy that never charges shipping.
    pub fn free(currency: Currency) -> Self {
        Self::new(Money::zero(currency), None)
    }

    /// Shipping charged on a post-discount subtotal.
    ///
    /// Empty carts ship free.
    pub fn shipping_for(
        &self,
        discounted_subtotal: &Money,
        cart_is_empty: bool,
    ) -> Result<Money, CommerceError> {
        if discounted_subtotal.currency != self.flat_rate.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.flat_rate.currency.code().to_string(),
                got: discounted_subtotal.currency.code().to_string(),
            });
        }
        if cart_is_empty {
            return Ok(Money::zero(self.flat_rate.currency));
        }
        let free = self
            .free_shipping_threshold
            .is_some_and(|t| discounted_subtotal.amount_cents >= t.amount_cents);
        if free {
            Ok(Money::zero(self.flat_rate.currency))
        } else {
            Ok(self.flat_rate)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inr(cents: i64) -> Money {
        Money::new(cents, Currency::INR)
    }

    #[test]
    fn test_shipping_threshold() {
        let policy = ShippingPolicy::new(inr(9_900), Some(inr(199_900)));
        assert_eq!(policy.shipping_for(&inr(100_000), false).unwrap(), inr(9_900));
        assert_eq!(policy.shipping_for(&inr(199_900), false).unwrap(), inr(0));
        assert_eq!(policy.shipping_for(&inr(0), true).unwrap(), inr(0));
    }

    #[test]
    fn test_shipping_without_threshold() {
        let policy = ShippingPolicy::new(inr(5_000), None);
        assert_eq!(policy.shipping_for(&inr(10_000_000), false).unwrap(), inr(5_000));
        assert!(ShippingPolicy::free(Currency::INR)
            .shipping_for(&inr(1), false)
            .unwrap()
            .is_zero());
    }
}
