//! Stock rules for product variants.

use crate::catalog::ProductVariant;
use serde::{Deserialize, Serialize};

/// Reason for a stock change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentReason {
    /// Sold through checkout.
    Sale,
    /// Returned to stock by a cancelled order.
    Cancellation,
    /// Restocked from supplier.
    Restock,
    /// Manual correction from the back-office.
    Correction,
}

impl AdjustmentReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentReason::Sale => "sale",
            AdjustmentReason::Cancellation => "cancellation",
            AdjustmentReason::Restock => "restock",
            AdjustmentReason::Correction => "correction",
        }
    }
}

impl ProductVariant {
    /// Apply a signed correction, clamping at zero. Returns the new stock.
    ///
    /// Checkout and cancellation move stock with guarded updates in the
    /// store; this rule covers back-office corrections.
    pub fn adjust(&mut self, delta: i64) -> i64 {
        self.stock = self.stock.saturating_add(delta).max(0);
        self.updated_at = crate::current_timestamp();
        self.stock
    }

    /// Check if stock is at or below `threshold`.
    pub fn is_low_stock(&self, threshold: i64) -> bool {
        self.stock <= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ProductId;

    fn variant(stock: i64) -> ProductVariant {
        ProductVariant::new(ProductId::new("p-1"), "SKU-1", stock)
    }

    #[test]
    fn test_adjust_clamps_at_zero() {
        let mut v = variant(3);
        assert_eq!(v.adjust(-10), 0);
        assert_eq!(v.adjust(7), 7);
        assert_eq!(v.adjust(i64::MAX), i64::MAX);
        assert_eq!(v.adjust(i64::MIN), 0);
    }

    #[test]
    fn test_low_stock() {
        let v = variant(2);
        assert!(v.is_low_stock(5));
        assert!(!v.is_low_stock(1));
    }
}
