//! Gateway webhook events.

use crate::error::CommerceError;
use serde::{Deserialize, Serialize};

/// Event types the storefront reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookEventKind {
    PaymentCaptured,
    PaymentFailed,
    Other,
}

/// A webhook delivery from the payment gateway.
///
/// ```json
/// {"event": "payment.captured",
///  "payload": {"payment": {"entity": {"id": "pay_1", "order_id": "order_1", "amount": 129900}}}}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebhookEvent {
    /// Event name, e.g. `payment.captured`.
    pub event: String,
    /// Event body.
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// The payment entity carried by payment events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebhookPayment {
    /// Gateway payment ID.
    pub id: String,
    /// Gateway order ID.
    pub order_id: String,
    /// Amount in minor units.
    #[serde(default)]
    pub amount: Option<i64>,
    /// Failure text for failed payments.
    #[serde(default)]
    pub error_description: Option<String>,
}

impl WebhookEvent {
    /// Parse a raw webhook body.
    pub fn parse(body: &[u8]) -> Result<Self, CommerceError> {
        Ok(serde_json::from_slice(body)?)
    }

    pub fn kind(&self) -> WebhookEventKind {
        match self.event.as_str() {
            "payment.captured" => WebhookEventKind::PaymentCaptured,
            "payment.failed" => WebhookEventKind::PaymentFailed,
            _ => WebhookEventKind::Other,
        }
    }

    /// Extract `payload.payment.entity`.
    pub fn payment(&self) -> Result<WebhookPayment, CommerceError> {
        let entity = self
            .payload
            .pointer("/payment/entity")
            .cloned()
            .ok_or_else(|| CommerceError::validation("webhook has no payment entity"))?;
        Ok(serde_json::from_value(entity)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_captured_event() {
        let body = br#"{"event":"payment.captured","payload":{"payment":{"entity":{"id":"pay_1","order_id":"order_1","amount":129900}}}}"#;
        let event = WebhookEvent::parse(body).unwrap();
        assert_eq!(event.kind(), WebhookEventKind::PaymentCaptured);
        let payment = event.payment().unwrap();
        assert_eq!(payment.id, "pay_1");
        assert_eq!(payment.order_id, "order_1");
        assert_eq!(payment.amount, Some(129900));
    }

    #[test]
    fn test_parse_failed_event() {
        let body = br#"{"event":"payment.failed","payload":{"payment":{"entity":{"id":"pay_2","order_id":"order_1","error_description":"declined"}}}}"#;
        let event = WebhookEvent::parse(body).unwrap();
        assert_eq!(event.kind(), WebhookEventKind::PaymentFailed);
        assert_eq!(
            event.payment().unwrap().error_description.as_deref(),
            Some("declined")
        );
    }

    #[test]
    fn test_other_events_and_bad_bodies() {
        let event = WebhookEvent::parse(br#"{"event":"refund.processed"}"#).unwrap();
        assert_eq!(event.kind(), WebhookEventKind::Other);
        assert!(event.payment().is_err());
        assert!(WebhookEvent::parse(b"not json").is_err());
    }
}
