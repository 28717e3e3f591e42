//! Order types and the order state machine.

use crate::cart::{Cart, CartPricing, LineItem};
use crate::checkout::Address;
use crate::error::CommerceError;
use crate::ids::{OrderId, OrderItemId, ProductId, UserId, VariantId};
use crate::money::{Currency, Money};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Order status.
///
/// ```text
/// Pending -> Confirmed -> Processing -> Shipped -> Delivered -> Refunded
///    |           |            |
///    +-----------+------------+--> Cancelled -> Refunded (paid orders)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order placed, awaiting payment or confirmation.
    #[default]
    Pending,
    /// Payment received or COD order accepted.
    Confirmed,
    /// Order being packed.
    Processing,
    /// Handed to the courier.
    Shipped,
    /// Delivered to the customer.
    Delivered,
    /// Order cancelled.
    Cancelled,
    /// Money returned to the customer.
    Refunded,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(OrderStatus::Pending),
            "confirmed" => Some(OrderStatus::Confirmed),
            "processing" => Some(OrderStatus::Processing),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" | "canceled" => Some(OrderStatus::Cancelled),
            "refunded" => Some(OrderStatus::Refunded),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Refunded => "Refunded",
        }
    }

    /// All statuses, in lifecycle order.
    pub fn all() -> [OrderStatus; 7] {
        [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
            OrderStatus::Refunded,
        ]
    }

    /// Check if the order can still be cancelled by staff.
    pub fn can_cancel(&self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::Confirmed | OrderStatus::Processing
        )
    }

    /// Check if the customer may cancel the order themselves.
    pub fn customer_can_cancel(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Confirmed)
    }

    /// Check whether `next` is a legal move from this status.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Processing)
                | (Confirmed, Cancelled)
                | (Processing, Shipped)
                | (Processing, Cancelled)
                | (Shipped, Delivered)
                | (Delivered, Refunded)
                | (Cancelled, Refunded)
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check whether moving an order from `from` to `to` returns its items
/// to stock.
pub fn needs_stock_restore(from: OrderStatus, to: OrderStatus) -> bool {
    to == OrderStatus::Cancelled && from.can_cancel()
}

/// Payment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Not paid yet.
    #[default]
    Pending,
    /// Paid in full.
    Paid,
    /// Last payment attempt failed.
    Failed,
    /// Refunded to the customer.
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(PaymentStatus::Pending),
            "paid" => Some(PaymentStatus::Paid),
            "failed" => Some(PaymentStatus::Failed),
            "refunded" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Hosted payment gateway.
    #[default]
    Online,
    /// Cash collected by the courier.
    #[serde(alias = "cod")]
    CashOnDelivery,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Online => "online",
            PaymentMethod::CashOnDelivery => "cash_on_delivery",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "online" => Some(PaymentMethod::Online),
            "cash_on_delivery" | "cod" => Some(PaymentMethod::CashOnDelivery),
            _ => None,
        }
    }
}

/// A placed order with a priced snapshot of its items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// Human-readable order number.
    pub order_number: String,
    /// Customer user ID.
    pub user_id: UserId,
    /// Customer email.
    pub email: String,
    /// Order status.
    pub status: OrderStatus,
    /// Payment status.
    pub payment_status: PaymentStatus,
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// Items in the order.
    pub items: Vec<OrderItem>,
    /// Shipping address snapshot.
    pub shipping_address: Address,
    /// Subtotal before discounts.
    pub subtotal: Money,
    /// Coupon discount.
    pub discount_total: Money,
    /// Shipping cost.
    pub shipping_total: Money,
    /// Grand total charged.
    pub grand_total: Money,
    /// Order currency.
    pub currency: Currency,
    /// Coupon code used.
    pub coupon_code: Option<String>,
    /// Customer note.
    pub note: Option<String>,
    /// Courier tracking number.
    pub tracking_number: Option<String>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
    /// Unix timestamp when cancelled (if applicable).
    pub cancelled_at: Option<i64>,
}

impl Order {
    /// Build a pending order from a priced cart.
    pub fn from_cart(
        cart: &Cart,
        pricing: &CartPricing,
        email: impl Into<String>,
        shipping_address: Address,
        payment_method: PaymentMethod,
        now: DateTime<Utc>,
    ) -> Result<Self, CommerceError> {
        if cart.is_empty() {
            return Err(CommerceError::validation("cart is empty"));
        }
        let timestamp = now.timestamp();
        Ok(Self {
            id: OrderId::generate(),
            order_number: generate_order_number(now),
            user_id: cart.user_id.clone(),
            email: email.into(),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method,
            items: cart.items.iter().map(OrderItem::from_line_item).collect(),
            shipping_address,
            subtotal: pricing.subtotal,
            discount_total: pricing.discount_total,
            shipping_total: pricing.shipping_total,
            grand_total: pricing.grand_total,
            currency: cart.currency,
            coupon_code: pricing.coupon_code.clone(),
            note: None,
            tracking_number: None,
            created_at: timestamp,
            updated_at: timestamp,
            cancelled_at: None,
        })
    }

    /// Get total item count.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Check if order is paid.
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    /// Move the order to `next`.
    ///
    /// Besides the status graph, two payment rules apply: an online order
    /// is only confirmed once paid, and only paid orders can be refunded.
    /// Delivering a cash-on-delivery order marks it paid.
    pub fn transition_to(&mut self, next: OrderStatus, now: i64) -> Result<(), CommerceError> {
        let invalid = || CommerceError::InvalidStatusTransition {
            from: self.status.as_str().to_string(),
            to: next.as_str().to_string(),
        };

        if !self.status.can_transition_to(next) {
            return Err(invalid());
        }
        if next == OrderStatus::Confirmed
            && self.payment_method == PaymentMethod::Online
            && !self.is_paid()
        {
            return Err(invalid());
        }
        if next == OrderStatus::Refunded && !self.is_paid() {
            return Err(invalid());
        }

        self.status = next;
        self.updated_at = now;
        match next {
            OrderStatus::Cancelled => self.cancelled_at = Some(now),
            OrderStatus::Delivered if self.payment_method == PaymentMethod::CashOnDelivery => {
                self.payment_status = PaymentStatus::Paid;
            }
            OrderStatus::Refunded => self.payment_status = PaymentStatus::Refunded,
            _ => {}
        }
        Ok(())
    }

    /// Record a successful online payment and confirm the order.
    ///
    /// Already-paid orders are left as they are.
    pub fn mark_paid(&mut self, now: i64) -> Result<(), CommerceError> {
        if self.is_paid() {
            return Ok(());
        }
        if self.status != OrderStatus::Pending {
            return Err(CommerceError::InvalidStatusTransition {
                from: self.status.as_str().to_string(),
                to: OrderStatus::Confirmed.as_str().to_string(),
            });
        }
        self.payment_status = PaymentStatus::Paid;
        self.transition_to(OrderStatus::Confirmed, now)
    }

    /// Record a failed payment attempt. The order stays pending.
    pub fn mark_payment_failed(&mut self, now: i64) {
        if self.payment_status == PaymentStatus::Pending {
            self.payment_status = PaymentStatus::Failed;
            self.updated_at = now;
        }
    }
}

/// A line in an order, frozen at checkout time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    /// Unique item identifier.
    pub id: OrderItemId,
    /// Product ID.
    pub product_id: ProductId,
    /// Variant ID.
    pub variant_id: VariantId,
    /// SKU at time of order.
    pub sku: String,
    /// Product name at time of order.
    pub name: String,
    /// Size label.
    pub size: Option<String>,
    /// Colour name.
    pub color: Option<String>,
    /// Quantity ordered.
    pub quantity: i64,
    /// Unit price at time of order.
    pub unit_price: Money,
    /// Total price for this line.
    pub total_price: Money,
}

impl OrderItem {
    /// Snapshot a cart line.
    pub fn from_line_item(item: &LineItem) -> Self {
        Self {
            id: OrderItemId::generate(),
            product_id: item.product_id.clone(),
            variant_id: item.variant_id.clone(),
            sku: item.sku.clone(),
            name: item.product_name.clone(),
            size: item.size.clone(),
            color: item.color.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            total_price: item.total_price,
        }
    }
}

const ORDER_NUMBER_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate an order number such as `MSN-20240915-K3X9QZ`.
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| ORDER_NUMBER_CHARSET[rng.gen_range(0..ORDER_NUMBER_CHARSET.len())] as char)
        .collect();
    format!("MSN-{}-{}", now.format("%Y%m%d"), suffix)
}
