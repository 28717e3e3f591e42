//! Checkout module.
//!
//! Contains address snapshots, orders, and the order state machine.

mod address;
mod order;

pub use address::Address;
pub use order::{
    generate_order_number, needs_stock_restore, Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus,
};
