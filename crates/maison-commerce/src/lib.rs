//! Storefront domain types and rules for Maison.
//!
//! This crate holds everything the storefront decides without talking to
//! the network:
//!
//! - **Catalog**: Products, variants, categories, stock rules
//! - **Cart**: Cart lines, coupons, pricing and shipping
//! - **Checkout**: Address snapshots, orders and the order state machine
//! - **Payment**: Gateway signatures, payment records, webhook events
//! - **Engagement**: Wishlists, reviews, newsletter subscriptions
//! - **Search**: Product listing filters, sorting and pagination
//!
//! # Example
//!
//! ```rust,ignore
//! use maison_commerce::prelude::*;
//!
//! let product = Product::new("Linen Shirt", "linen-shirt", Money::new(249900, Currency::INR));
//! let variant = ProductVariant::new(product.id.clone(), "LS-M-WHT", 12);
//!
//! let mut cart = Cart::new(UserId::new("user-1"), Currency::INR);
//! cart.add_item(LineItem::new(&product, &variant, 2)?)?;
//!
//! let shipping = ShippingPolicy::new(Money::new(9900, Currency::INR), None);
//! let pricing = cart.calculate_pricing(None, &shipping, current_timestamp())?;
//! println!("Total: {}", pricing.grand_total.display());
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod engagement;
pub mod payment;
pub mod search;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::current_timestamp;
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{
        slugify, validate_slug, AdjustmentReason, Category, Product, ProductStatus,
        ProductVariant,
    };

    // Cart
    pub use crate::cart::{
        Cart, CartPricing, Coupon, CouponKind, LineItem, LineItemPricing, ShippingPolicy,
        MAX_QUANTITY_PER_ITEM,
    };

    // Checkout
    pub use crate::checkout::{
        Address, Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus,
    };

    // Payment
    pub use crate::payment::{
        PaymentRecord, PaymentRecordStatus, WebhookEvent, WebhookEventKind,
    };

    // Engagement
    pub use crate::engagement::{
        normalize_email, RatingSummary, Review, ReviewDraft, Subscriber, Wishlist,
    };

    // Search
    pub use crate::search::{Pagination, ProductFilter, ProductQuery, SearchResults, SortOption};
}

/// Current Unix timestamp in seconds.
pub fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}
