//! Payment attempts recorded against an order.

use crate::error::CommerceError;
use crate::ids::{OrderId, PaymentId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Status of one gateway payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentRecordStatus {
    /// Gateway order created, customer hasn't paid yet.
    #[default]
    Created,
    /// Money captured.
    Captured,
    /// Attempt failed or signature mismatch.
    Failed,
    /// Captured money returned.
    Refunded,
}

impl PaymentRecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentRecordStatus::Created => "created",
            PaymentRecordStatus::Captured => "captured",
            PaymentRecordStatus::Failed => "failed",
            PaymentRecordStatus::Refunded => "refunded",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "created" => Some(PaymentRecordStatus::Created),
            "captured" => Some(PaymentRecordStatus::Captured),
            "failed" => Some(PaymentRecordStatus::Failed),
            "refunded" => Some(PaymentRecordStatus::Refunded),
            _ => None,
        }
    }
}

/// A gateway payment attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRecord {
    /// Unique payment identifier.
    pub id: PaymentId,
    /// Order being paid.
    pub order_id: OrderId,
    /// Gateway name (e.g., "razorpay", "mock").
    pub provider: String,
    /// Order ID issued by the gateway.
    pub gateway_order_id: String,
    /// Payment ID issued by the gateway once the customer pays.
    pub gateway_payment_id: Option<String>,
    /// Amount requested.
    pub amount: Money,
    /// Attempt status.
    pub status: PaymentRecordStatus,
    /// Signature that confirmed the capture.
    pub signature: Option<String>,
    /// Gateway error text for failed attempts.
    pub failure_reason: Option<String>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl PaymentRecord {
    /// Record a freshly created gateway order.
    pub fn new(
        order_id: OrderId,
        provider: impl Into<String>,
        gateway_order_id: impl Into<String>,
        amount: Money,
    ) -> Self {
        let now = crate::current_timestamp();
        Self {
            id: PaymentId::generate(),
            order_id,
            provider: provider.into(),
            gateway_order_id: gateway_order_id.into(),
            gateway_payment_id: None,
            amount,
            status: PaymentRecordStatus::Created,
            signature: None,
            failure_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if money was captured.
    pub fn is_captured(&self) -> bool {
        self.status == PaymentRecordStatus::Captured
    }

    /// Mark the attempt captured.
    ///
    /// Returns `false` when it was already captured with the same payment
    /// ID, so callers can skip repeated side effects.
    pub fn capture(
        &mut self,
        gateway_payment_id: &str,
        signature: Option<String>,
        now: i64,
    ) -> Result<bool, CommerceError> {
        match self.status {
            PaymentRecordStatus::Captured
                if self.gateway_payment_id.as_deref() == Some(gateway_payment_id) =>
            {
                Ok(false)
            }
            PaymentRecordStatus::Created | PaymentRecordStatus::Failed => {
                self.status = PaymentRecordStatus::Captured;
                self.gateway_payment_id = Some(gateway_payment_id.to_string());
                self.signature = signature;
                self.failure_reason = None;
                self.updated_at = now;
                Ok(true)
            }
            other => Err(CommerceError::InvalidStatusTransition {
                from: other.as_str().to_string(),
                to: PaymentRecordStatus::Captured.as_str().to_string(),
            }),
        }
    }

    /// Mark the attempt failed. Captured or refunded attempts are left
    /// alone and `false` is returned.
    pub fn fail(
        &mut self,
        gateway_payment_id: Option<&str>,
        reason: impl Into<String>,
        now: i64,
    ) -> bool {
        if matches!(
            self.status,
            PaymentRecordStatus::Captured | PaymentRecordStatus::Refunded
        ) {
            return false;
        }
        if let Some(id) = gateway_payment_id {
            self.gateway_payment_id = Some(id.to_string());
        }
        self.status = PaymentRecordStatus::Failed;
        self.failure_reason = Some(reason.into());
        self.updated_at = now;
        true
    }

    /// Mark a captured attempt refunded.
    pub fn refund(&mut self, now: i64) -> Result<(), CommerceError> {
        if self.status != PaymentRecordStatus::Captured {
            return Err(CommerceError::InvalidStatusTransition {
                from: self.status.as_str().to_string(),
                to: PaymentRecordStatus::Refunded.as_str().to_string(),
            });
        }
        self.status = PaymentRecordStatus::Refunded;
        self.updated_at = now;
        Ok(())
    }
}
