//! Shopping cart module.
//!
//! Contains types for cart lines, coupons, pricing, and shipping.

mod cart;
mod coupon;
mod pricing;

pub use cart::{Cart, LineItem, MAX_QUANTITY_PER_ITEM};
pub use coupon::{normalize_code, Coupon, CouponKind};
pub use pricing::{CartPricing, LineItemPricing, ShippingPolicy};
