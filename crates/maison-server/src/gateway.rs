//! Payment gateway client.
//!
//! The storefront talks to a hosted gateway for two things: opening a
//! gateway order the customer pays against, and refunding a captured
//! payment. Signature checks live in `maison_commerce::payment`.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use maison_commerce::Money;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{PaymentConfig, PaymentMode};

/// Errors from the payment gateway.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway answered with a non-2xx status.
    #[error("gateway rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected gateway response: {0}")]
    InvalidResponse(String),
}

/// A payment order opened at the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewayOrder {
    pub id: String,
    /// Amount in minor units.
    pub amount: i64,
    pub currency: String,
}

/// A refund issued by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewayRefund {
    pub id: String,
    pub payment_id: String,
    pub amount: i64,
}

/// Operations the storefront needs from a payment provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Provider name stored on payment records.
    fn provider(&self) -> &'static str;

    /// Public key the client-side checkout widget is opened with.
    fn key_id(&self) -> &str;

    /// Open a gateway order for `amount`. `receipt` is our order number.
    async fn create_order(&self, amount: Money, receipt: &str)
        -> Result<GatewayOrder, GatewayError>;

    /// Refund `amount` of a captured payment.
    async fn refund(&self, payment_id: &str, amount: Money)
        -> Result<GatewayRefund, GatewayError>;
}

/// Build the gateway selected by `payment.mode`.
pub fn from_config(config: &PaymentConfig) -> Result<Arc<dyn PaymentGateway>, GatewayError> {
    match config.mode {
        PaymentMode::Mock => {
            info!("using mock payment gateway");
            Ok(Arc::new(MockGateway::new(config.key_id.clone())))
        }
        PaymentMode::Live => {
            info!(api_base = %config.api_base, "using live payment gateway");
            Ok(Arc::new(HttpGateway::new(config)?))
        }
    }
}

#[derive(Serialize)]
struct CreateOrderRequest<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

#[derive(Serialize)]
struct RefundRequest {
    amount: i64,
}

/// Gateway reached over HTTPS with basic auth (key id / key secret).
pub struct HttpGateway {
    client: reqwest::Client,
    api_base: String,
    key_id: String,
    key_secret: String,
}

impl HttpGateway {
    pub fn new(config: &PaymentConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
        })
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.api_base, path);
        debug!(%url, "gateway request");
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl PaymentGateway for HttpGateway {
    fn provider(&self) -> &'static str {
        "razorpay"
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }

    async fn create_order(
        &self,
        amount: Money,
        receipt: &str,
    ) -> Result<GatewayOrder, GatewayError> {
        let request = CreateOrderRequest {
            amount: amount.amount_cents,
            currency: amount.currency.code(),
            receipt,
        };
        self.post("/v1/orders", &request).await
    }

    async fn refund(&self, payment_id: &str, amount: Money) -> Result<GatewayRefund, GatewayError> {
        let request = RefundRequest {
            amount: amount.amount_cents,
        };
        self.post(&format!("/v1/payments/{payment_id}/refund"), &request)
            .await
    }
}

/// In-process gateway for local runs and tests.
///
/// Order ids are `order_mock_<n>`, counted from 1.
#[derive(Debug, Default)]
pub struct MockGateway {
    key_id: String,
    next_order: AtomicU64,
    refunds: Mutex<Vec<GatewayRefund>>,
    fail_next: AtomicBool,
}

impl MockGateway {
    pub fn new(key_id: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            next_order: AtomicU64::new(0),
            refunds: Mutex::new(Vec::new()),
            fail_next: AtomicBool::new(false),
        }
    }

    /// Make the next call, of either kind, fail as a 503 from the gateway.
    pub fn fail_next_call(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn check_outage(&self) -> Result<(), GatewayError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(GatewayError::Rejected {
                status: 503,
                message: "mock gateway unavailable".to_string(),
            });
        }
        Ok(())
    }

    /// Refunds issued so far.
    pub fn refunds(&self) -> Vec<GatewayRefund> {
        self.refunds
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    fn provider(&self) -> &'static str {
        "mock"
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }

    async fn create_order(
        &self,
        amount: Money,
        _receipt: &str,
    ) -> Result<GatewayOrder, GatewayError> {
        self.check_outage()?;
        let n = self.next_order.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(GatewayOrder {
            id: format!("order_mock_{n}"),
            amount: amount.amount_cents,
            currency: amount.currency.code().to_string(),
        })
    }

    async fn refund(&self, payment_id: &str, amount: Money) -> Result<GatewayRefund, GatewayError> {
        self.check_outage()?;
        let mut refunds = self
            .refunds
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let refund = GatewayRefund {
            id: format!("rfnd_mock_{}", refunds.len() + 1),
            payment_id: payment_id.to_string(),
            amount: amount.amount_cents,
        };
        refunds.push(refund.clone());
        Ok(refund)
    }
}
