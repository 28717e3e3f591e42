//! Payment confirmation from the browser callback and gateway webhooks.
//!
//! Both paths end in [`capture`] or [`record_failure`], which are safe to
//! repeat: a capture already recorded with the same gateway payment ID
//! changes nothing.

use maison_auth::User;
use maison_commerce::checkout::{Order, OrderStatus, PaymentStatus};
use maison_commerce::payment::{
    verify_payment_signature, verify_webhook_signature, PaymentRecord, PaymentRecordStatus,
    WebhookEvent, WebhookEventKind,
};
use maison_commerce::{current_timestamp, CommerceError};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::repo::{orders, payments};
use crate::services::orders as order_service;
use crate::state::AppState;

/// Fields the gateway's checkout widget hands back to the browser.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyRequest {
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub signature: String,
}

/// What a webhook delivery did.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WebhookOutcome {
    Processed,
    Ignored,
}

async fn load(state: &AppState, gateway_order_id: &str) -> Result<(PaymentRecord, Order), ApiError> {
    let payment = payments::find_by_gateway_order(&state.db, gateway_order_id)
        .await?
        .ok_or_else(|| ApiError::not_found("payment"))?;
    let order = orders::find(&state.db, &payment.order_id)
        .await?
        .ok_or_else(|| ApiError::not_found("order"))?;
    Ok((payment, order))
}

/// Check the checkout signature and capture the payment.
pub async fn verify(state: &AppState, user: &User, request: VerifyRequest) -> Result<Order, ApiError> {
    let (payment, order) = load(state, &request.gateway_order_id).await?;
    if order.user_id != user.id {
        return Err(ApiError::not_found("payment"));
    }

    let checked = verify_payment_signature(
        &state.config.payment.key_secret,
        &request.gateway_order_id,
        &request.gateway_payment_id,
        &request.signature,
    );
    match checked {
        Ok(()) => {}
        Err(CommerceError::InvalidSignature) => {
            warn!(
                order_id = %order.id,
                gateway_order_id = %request.gateway_order_id,
                "payment signature mismatch"
            );
            record_failure(
                state,
                payment,
                order,
                Some(&request.gateway_payment_id),
                "signature mismatch",
            )
            .await?;
            return Err(CommerceError::InvalidSignature.into());
        }
        Err(e) => return Err(e.into()),
    }

    capture(
        state,
        payment,
        order,
        &request.gateway_payment_id,
        Some(request.signature),
    )
    .await
}

/// Record a captured payment and confirm the order.
///
/// A capture for an order the customer already cancelled is recorded and
/// then refunded.
pub async fn capture(
    state: &AppState,
    mut payment: PaymentRecord,
    mut order: Order,
    gateway_payment_id: &str,
    signature: Option<String>,
) -> Result<Order, ApiError> {
    let now = current_timestamp();
    let already_refunded = payment.status == PaymentRecordStatus::Refunded
        && payment.gateway_payment_id.as_deref() == Some(gateway_payment_id);
    if already_refunded || !payment.capture(gateway_payment_id, signature, now)? {
        return Ok(order);
    }

    let from = order.status;
    if from == OrderStatus::Cancelled {
        order.payment_status = PaymentStatus::Paid;
        order.updated_at = now;
    } else {
        order.mark_paid(now)?;
    }

    let mut tx = state.db.begin().await?;
    payments::save(&mut tx, &payment).await?;
    if !orders::save_state(&mut tx, &order, from).await? {
        return Err(ApiError::Conflict(format!(
            "order {} was updated by another request",
            order.order_number
        )));
    }
    tx.commit().await?;

    info!(
        order_id = %order.id,
        gateway_payment_id,
        amount = payment.amount.amount_cents,
        "payment captured"
    );

    if from == OrderStatus::Cancelled {
        warn!(order_id = %order.id, "payment captured for a cancelled order, refunding");
        order_service::refund_cancelled(state, &mut order).await?;
    }
    Ok(order)
}

/// Mark an attempt failed. The order stays pending so the customer can
/// retry.
pub async fn record_failure(
    state: &AppState,
    mut payment: PaymentRecord,
    mut order: Order,
    gateway_payment_id: Option<&str>,
    reason: &str,
) -> Result<Order, ApiError> {
    let now = current_timestamp();
    if !payment.fail(gateway_payment_id, reason, now) {
        return Ok(order);
    }
    order.mark_payment_failed(now);

    let mut tx = state.db.begin().await?;
    payments::save(&mut tx, &payment).await?;
    orders::save_state(&mut tx, &order, order.status).await?;
    tx.commit().await?;

    info!(order_id = %order.id, reason, "payment failed");
    Ok(order)
}

/// Handle a signed webhook delivery.
pub async fn handle_webhook(
    state: &AppState,
    signature: Option<&str>,
    body: &[u8],
) -> Result<WebhookOutcome, ApiError> {
    let signature =
        signature.ok_or_else(|| ApiError::Unauthorized("missing webhook signature".to_string()))?;
    match verify_webhook_signature(&state.config.payment.webhook_secret, body, signature) {
        Ok(()) => {}
        Err(CommerceError::InvalidSignature) => {
            warn!("webhook signature mismatch");
            return Err(ApiError::Unauthorized("invalid webhook signature".to_string()));
        }
        Err(e) => return Err(e.into()),
    }

    let event = WebhookEvent::parse(body)
        .map_err(|e| ApiError::BadRequest(format!("malformed webhook body: {e}")))?;
    let kind = event.kind();
    if kind == WebhookEventKind::Other {
        info!(event = %event.event, "webhook ignored");
        return Ok(WebhookOutcome::Ignored);
    }
    let entity = event
        .payment()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let (payment, order) = match load(state, &entity.order_id).await {
        Ok(found) => found,
        Err(ApiError::NotFound(_)) => {
            warn!(gateway_order_id = %entity.order_id, "webhook for unknown gateway order");
            return Ok(WebhookOutcome::Ignored);
        }
        Err(e) => return Err(e),
    };

    match kind {
        WebhookEventKind::PaymentCaptured => {
            if entity
                .amount
                .is_some_and(|amount| amount != payment.amount.amount_cents)
            {
                warn!(
                    order_id = %order.id,
                    expected = payment.amount.amount_cents,
                    got = ?entity.amount,
                    "captured amount mismatch"
                );
                record_failure(state, payment, order, Some(&entity.id), "amount mismatch").await?;
                return Ok(WebhookOutcome::Processed);
            }
            capture(state, payment, order, &entity.id, None).await?;
        }
        WebhookEventKind::PaymentFailed => {
            let reason = entity
                .error_description
                .as_deref()
                .unwrap_or("payment failed at gateway");
            record_failure(state, payment, order, Some(&entity.id), reason).await?;
        }
        WebhookEventKind::Other => return Ok(WebhookOutcome::Ignored),
    }
    Ok(WebhookOutcome::Processed)
}
