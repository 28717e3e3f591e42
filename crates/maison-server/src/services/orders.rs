//! Order status changes.
//!
//! Every change is written with a conditional update on the status the
//! order was read with, so two racing requests cannot both apply.
//! Cancelling returns the order's units to stock in the same transaction.

use maison_commerce::checkout::{needs_stock_restore, Order, OrderStatus, PaymentMethod};
use maison_commerce::current_timestamp;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::repo::{catalog, orders, payments};
use crate::state::AppState;

/// Move an order to `next`, restoring stock when it is cancelled.
///
/// Does not touch the gateway.
pub async fn apply_transition(
    state: &AppState,
    order: &mut Order,
    next: OrderStatus,
    tracking_number: Option<String>,
) -> Result<(), ApiError> {
    let from = order.status;
    let now = current_timestamp();
    order.transition_to(next, now)?;
    if tracking_number.is_some() {
        order.tracking_number = tracking_number;
    }

    let mut tx = state.db.begin().await?;
    if !orders::save_state(&mut tx, order, from).await? {
        return Err(ApiError::Conflict(format!(
            "order {} was updated by another request",
            order.order_number
        )));
    }
    if needs_stock_restore(from, next) {
        for item in &order.items {
            if !catalog::restore_stock(&mut tx, &item.variant_id, item.quantity, now).await? {
                warn!(variant_id = %item.variant_id, "variant gone, stock not restored");
            }
        }
    }
    tx.commit().await?;

    info!(
        order_id = %order.id,
        from = from.as_str(),
        to = next.as_str(),
        "order status changed"
    );
    Ok(())
}

/// Cancel an order; a paid online order is then refunded through the
/// gateway.
pub async fn cancel(state: &AppState, order: &mut Order) -> Result<(), ApiError> {
    apply_transition(state, order, OrderStatus::Cancelled, None).await?;
    if order.is_paid() {
        refund_cancelled(state, order).await?;
    }
    Ok(())
}

/// Refund a cancelled, paid order.
///
/// A gateway failure is logged and leaves the order cancelled and paid,
/// so an admin can retry with an explicit refund.
pub async fn refund_cancelled(state: &AppState, order: &mut Order) -> Result<(), ApiError> {
    match refund(state, order).await {
        Ok(()) => Ok(()),
        Err(ApiError::Gateway(message)) => {
            warn!(order_id = %order.id, error = %message, "automatic refund failed");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Refund a paid order that is delivered or cancelled.
///
/// Online orders are refunded at the gateway before anything is written;
/// cash-on-delivery refunds are settled outside the system.
pub async fn refund(state: &AppState, order: &mut Order) -> Result<(), ApiError> {
    let from = order.status;
    let now = current_timestamp();
    let mut refunded = order.clone();
    refunded.transition_to(OrderStatus::Refunded, now)?;

    let captured = match order.payment_method {
        PaymentMethod::Online => payments::find_captured_for_order(&state.db, &order.id).await?,
        PaymentMethod::CashOnDelivery => None,
    };

    let captured = match captured {
        Some(mut payment) => {
            let payment_id = payment.gateway_payment_id.clone().ok_or_else(|| {
                ApiError::Internal(format!("captured payment {} has no gateway id", payment.id))
            })?;
            let receipt = state.gateway.refund(&payment_id, payment.amount).await?;
            info!(order_id = %order.id, refund_id = %receipt.id, "gateway refund issued");
            payment.refund(now)?;
            Some(payment)
        }
        None => None,
    };

    let mut tx = state.db.begin().await?;
    if !orders::save_state(&mut tx, &refunded, from).await? {
        return Err(ApiError::Conflict(format!(
            "order {} was updated by another request",
            order.order_number
        )));
    }
    if let Some(payment) = &captured {
        payments::save(&mut tx, payment).await?;
    }
    tx.commit().await?;

    info!(order_id = %order.id, from = from.as_str(), "order refunded");
    *order = refunded;
    Ok(())
}

/// Apply an admin status change.
pub async fn update_status(
    state: &AppState,
    order: &mut Order,
    next: OrderStatus,
    tracking_number: Option<String>,
) -> Result<(), ApiError> {
    match next {
        OrderStatus::Cancelled => cancel(state, order).await,
        OrderStatus::Refunded => refund(state, order).await,
        _ => apply_transition(state, order, next, tracking_number).await,
    }
}
