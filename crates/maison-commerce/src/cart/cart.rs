//! Cart and line item types.

use crate::cart::{CartPricing, Coupon, LineItemPricing, ShippingPolicy};
use crate::catalog::{Product, ProductVariant};
use crate::error::CommerceError;
use crate::ids::{ProductId, UserId, VariantId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Maximum quantity allowed per line item.
pub const MAX_QUANTITY_PER_ITEM: i64 = 10;

/// A customer's shopping cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    /// Owner of the cart.
    pub user_id: UserId,
    /// Items in the cart.
    pub items: Vec<LineItem>,
    /// Cart currency.
    pub currency: Currency,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Cart {
    /// Create an empty cart for a user.
    pub fn new(user_id: UserId, currency: Currency) -> Self {
        Self {
            user_id,
            items: Vec::new(),
            currency,
            updated_at: crate::current_timestamp(),
        }
    }

    /// Add an item to the cart, merging with an existing line for the
    /// same variant.
    ///
    /// Returns the resulting quantity of that line. Errors if the quantity
    /// is not positive, the merged quantity exceeds
    /// [`MAX_QUANTITY_PER_ITEM`], or the currency differs from the cart's.
    pub fn add_item(&mut self, item: LineItem) -> Result<i64, CommerceError> {
        if item.quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(item.quantity));
        }
        if item.unit_price.currency != self.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: item.unit_price.currency.code().to_string(),
            });
        }

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.variant_id == item.variant_id)
        {
            let new_quantity = existing
                .quantity
                .checked_add(item.quantity)
                .ok_or(CommerceError::Overflow)?;
            if new_quantity > MAX_QUANTITY_PER_ITEM {
                return Err(CommerceError::QuantityExceedsLimit(
                    new_quantity,
                    MAX_QUANTITY_PER_ITEM,
                ));
            }
            existing.quantity = new_quantity;
            existing.update_total()?;
            self.updated_at = crate::current_timestamp();
            return Ok(new_quantity);
        }

        if item.quantity > MAX_QUANTITY_PER_ITEM {
            return Err(CommerceError::QuantityExceedsLimit(
                item.quantity,
                MAX_QUANTITY_PER_ITEM,
            ));
        }

        let quantity = item.quantity;
        self.items.push(item);
        self.updated_at = crate::current_timestamp();
        Ok(quantity)
    }

    /// Update a line's quantity.
    ///
    /// A quantity of zero or less removes the line. Returns whether the
    /// line existed.
    pub fn update_quantity(
        &mut self,
        variant_id: &VariantId,
        quantity: i64,
    ) -> Result<bool, CommerceError> {
        if quantity <= 0 {
            return Ok(self.remove_item(variant_id));
        }
        if quantity > MAX_QUANTITY_PER_ITEM {
            return Err(CommerceError::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_ITEM,
            ));
        }

        match self.items.iter_mut().find(|i| &i.variant_id == variant_id) {
            Some(item) => {
                item.quantity = quantity;
                item.update_total()?;
                self.updated_at = crate::current_timestamp();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove a line from the cart.
    pub fn remove_item(&mut self, variant_id: &VariantId) -> bool {
        let len_before = self.items.len();
        self.items.retain(|i| &i.variant_id != variant_id);
        let removed = self.items.len() < len_before;
        if removed {
            self.updated_at = crate::current_timestamp();
        }
        removed
    }

    /// Clear all items from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        self.updated_at = crate::current_timestamp();
    }

    /// Get total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get a line by variant ID.
    pub fn get_item(&self, variant_id: &VariantId) -> Option<&LineItem> {
        self.items.iter().find(|i| &i.variant_id == variant_id)
    }

    /// Sum of all line totals.
    pub fn subtotal(&self) -> Result<Money, CommerceError> {
        Money::try_sum(self.items.iter().map(|i| &i.total_price), self.currency)
    }

    /// Calculate cart pricing with an optional coupon.
    ///
    /// The coupon is validated against the subtotal at `now`; shipping is
    /// charged on the subtotal after the discount.
    pub fn calculate_pricing(
        &self,
        coupon: Option<&Coupon>,
        shipping: &ShippingPolicy,
        now: i64,
    ) -> Result<CartPricing, CommerceError> {
        let line_items: Vec<LineItemPricing> = self
            .items
            .iter()
            .map(|item| LineItemPricing {
                variant_id: item.variant_id.clone(),
                unit_price: item.unit_price,
                quantity: item.quantity,
                total: item.total_price,
            })
            .collect();

        let subtotal = self.subtotal()?;

        let discount_total = match coupon {
            Some(coupon) if !self.is_empty() => coupon.apply(&subtotal, now)?,
            _ => Money::zero(self.currency),
        };

        let discounted = subtotal.try_subtract(&discount_total)?;
        let shipping_total = shipping.shipping_for(&discounted, self.is_empty())?;
        let grand_total = discounted.try_add(&shipping_total)?;

        Ok(CartPricing {
            subtotal,
            discount_total,
            shipping_total,
            grand_total,
            coupon_code: coupon
                .filter(|_| discount_total.is_positive())
                .map(|c| c.code.clone()),
            line_items,
        })
    }
}

/// A line in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    /// Variant being purchased.
    pub variant_id: VariantId,
    /// Product ID.
    pub product_id: ProductId,
    /// Product name (denormalized for display).
    pub product_name: String,
    /// Product slug for linking back.
    pub product_slug: String,
    /// Variant SKU.
    pub sku: String,
    /// Size label.
    pub size: Option<String>,
    /// Colour name.
    pub color: Option<String>,
    /// Cover image.
    pub image: Option<String>,
    /// Quantity.
    pub quantity: i64,
    /// Units currently in stock.
    pub available_stock: i64,
    /// Unit price.
    pub unit_price: Money,
    /// Total price (unit_price * quantity).
    pub total_price: Money,
}

impl LineItem {
    /// Create a line for `quantity` units of a variant.
    pub fn new(
        product: &Product,
        variant: &ProductVariant,
        quantity: i64,
    ) -> Result<Self, CommerceError> {
        let unit_price = variant.effective_price(product);
        let total_price = unit_price.try_multiply(quantity)?;
        Ok(Self {
            variant_id: variant.id.clone(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            product_slug: product.slug.clone(),
            sku: variant.sku.clone(),
            size: variant.size.clone(),
            color: variant.color.clone(),
            image: product.cover_image().map(str::to_string),
            quantity,
            available_stock: variant.stock,
            unit_price,
            total_price,
        })
    }

    /// Update the total price based on quantity.
    pub fn update_total(&mut self) -> Result<(), CommerceError> {
        self.total_price = self.unit_price.try_multiply(self.quantity)?;
        Ok(())
    }

    /// Check whether current stock covers this line.
    pub fn is_fulfillable(&self) -> bool {
        self.available_stock >= self.quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inr(cents: i64) -> Money {
        Money::new(cents, Currency::INR)
    }

    fn line(sku: &str, price: i64, quantity: i64) -> LineItem {
        let product = Product::new(format!("Product {sku}"), sku.to_lowercase(), inr(price));
        let variant = ProductVariant::new(product.id.clone(), sku, 50);
        LineItem::new(&product, &variant, quantity).unwrap()
    }

    fn cart() -> Cart {
        Cart::new(UserId::new("user-1"), Currency::INR)
    }

    #[test]
    fn test_add_item() {
        let mut cart = cart();
        assert_eq!(cart.add_item(line("A", 1000, 2)).unwrap(), 2);
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.items.len(), 1);
    }

    #[test]
    fn test_add_same_variant_merges() {
        let mut cart = cart();
        let item = line("A", 1000, 1);
        let mut again = item.clone();
        again.quantity = 2;
        again.update_total().unwrap();

        cart.add_item(item).unwrap();
        assert_eq!(cart.add_item(again).unwrap(), 3);
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].total_price, inr(3000));
    }

    #[test]
    fn test_quantity_limits() {
        let mut cart = cart();
        assert!(matches!(
            cart.add_item(line("A", 1000, 0)),
            Err(CommerceError::InvalidQuantity(0))
        ));
        assert!(matches!(
            cart.add_item(line("A", 1000, MAX_QUANTITY_PER_ITEM + 1)),
            Err(CommerceError::QuantityExceedsLimit(..))
        ));

        let item = line("B", 1000, MAX_QUANTITY_PER_ITEM);
        let mut one_more = item.clone();
        one_more.quantity = 1;
        cart.add_item(item).unwrap();
        assert!(cart.add_item(one_more).is_err());
        assert_eq!(cart.item_count(), MAX_QUANTITY_PER_ITEM);
    }

    #[test]
    fn test_update_and_remove() {
        let mut cart = cart();
        let item = line("A", 1000, 1);
        let variant_id = item.variant_id.clone();
        cart.add_item(item).unwrap();

        assert!(cart.update_quantity(&variant_id, 5).unwrap());
        assert_eq!(cart.item_count(), 5);
        assert!(!cart
            .update_quantity(&VariantId::new("missing"), 2)
            .unwrap());

        assert!(cart.update_quantity(&variant_id, 0).unwrap());
        assert!(cart.is_empty());
        assert!(!cart.remove_item(&variant_id));
    }

    #[test]
    fn test_pricing_without_coupon() {
        let mut cart = cart();
        cart.add_item(line("A", 1000, 2)).unwrap();
        cart.add_item(line("B", 2000, 1)).unwrap();

        let shipping = ShippingPolicy::new(inr(500), Some(inr(10_000)));
        let pricing = cart.calculate_pricing(None, &shipping, 0).unwrap();
        assert_eq!(pricing.subtotal, inr(4000));
        assert_eq!(pricing.shipping_total, inr(500));
        assert_eq!(pricing.grand_total, inr(4500));
        assert_eq!(pricing.line_items.len(), 2);
        assert!(pricing.coupon_code.is_none());
    }

    #[test]
    fn test_pricing_with_coupon_drops_below_free_shipping() {
        let mut cart = cart();
        cart.add_item(line("A", 10_000, 1)).unwrap();

        let shipping = ShippingPolicy::new(inr(500), Some(inr(10_000)));
        let coupon = Coupon::percentage("SAVE10", 10, Currency::INR);
        let pricing = cart.calculate_pricing(Some(&coupon), &shipping, 0).unwrap();

        assert_eq!(pricing.discount_total, inr(1000));
        assert_eq!(pricing.shipping_total, inr(500));
        assert_eq!(pricing.grand_total, inr(9500));
        assert_eq!(pricing.coupon_code.as_deref(), Some("SAVE10"));
    }

    #[test]
    fn test_pricing_rejects_coupon_below_minimum() {
        let mut cart = cart();
        cart.add_item(line("A", 1000, 1)).unwrap();
        let coupon = Coupon::fixed("FLAT", inr(200)).with_min_order(inr(5000));
        let result = cart.calculate_pricing(Some(&coupon), &ShippingPolicy::free(Currency::INR), 0);
        assert!(matches!(
            result,
            Err(CommerceError::CouponMinimumNotMet { .. })
        ));
    }

    #[test]
    fn test_empty_cart_pricing() {
        let cart = cart();
        let shipping = ShippingPolicy::new(inr(500), None);
        let pricing = cart.calculate_pricing(None, &shipping, 0).unwrap();
        assert!(pricing.grand_total.is_zero());
    }
}
