//! Payment module.
//!
//! Contains gateway signature checks, payment records, and webhook events.

mod record;
mod signature;
mod webhook;

pub use record::{PaymentRecord, PaymentRecordStatus};
pub use signature::{
    payment_signature, verify_payment_signature, verify_webhook_signature, webhook_signature,
};
pub use webhook::{WebhookEvent, WebhookEventKind, WebhookPayment};
