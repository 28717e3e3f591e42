//! Multi-step operations that span several tables or the payment gateway.
//!
//! Handlers stay thin; anything that needs a transaction, stock movement,
//! or a gateway call lives here.

pub mod cart;
pub mod checkout;
pub mod orders;
pub mod payments;
