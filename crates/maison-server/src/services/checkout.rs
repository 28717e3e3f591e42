//! Checkout: turn the caller's cart into an order.
//!
//! Stock, the order rows and coupon usage are written in one transaction.
//! For online payment a gateway order is opened after the commit and the
//! cart is emptied only once that succeeds; if it fails the new order is
//! cancelled, its stock and coupon redemption are returned and the cart is
//! left as it was.

use chrono::Utc;
use maison_auth::User;
use maison_commerce::checkout::{Order, OrderStatus, PaymentMethod};
use maison_commerce::payment::PaymentRecord;
use maison_commerce::{current_timestamp, AddressId, CommerceError};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::repo::{addresses, cart as cart_repo, catalog, coupons, orders, payments};
use crate::services::{cart::load_cart, orders as order_service};
use crate::state::AppState;

/// Longest note a customer can attach to an order.
const MAX_NOTE_LENGTH: usize = 500;

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub address_id: AddressId,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// What the browser needs to open the gateway's checkout widget.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PaymentIntent {
    pub provider: String,
    pub key_id: String,
    pub gateway_order_id: String,
    /// Amount in minor units.
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResult {
    pub order: Order,
    pub payment: Option<PaymentIntent>,
}

fn clean_note(note: Option<String>) -> Result<Option<String>, ApiError> {
    let note = note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
    if note
        .as_ref()
        .is_some_and(|n| n.chars().count() > MAX_NOTE_LENGTH)
    {
        return Err(ApiError::validation(format!(
            "note must be at most {MAX_NOTE_LENGTH} characters"
        )));
    }
    Ok(note)
}

/// Place an order from the user's cart.
pub async fn place_order(
    state: &AppState,
    user: &User,
    request: CheckoutRequest,
) -> Result<CheckoutResult, ApiError> {
    let now = Utc::now();
    let timestamp = now.timestamp();
    let note = clean_note(request.note)?;

    let cart = load_cart(state, &user.id).await?;
    if cart.is_empty() {
        return Err(ApiError::validation("cart is empty"));
    }
    for item in &cart.items {
        let available = catalog::find_product(&state.db, &item.product_id)
            .await?
            .is_some_and(|p| p.is_available());
        if !available {
            return Err(ApiError::validation(format!(
                "{} is no longer available",
                item.product_name
            )));
        }
        if !item.is_fulfillable() {
            return Err(CommerceError::InsufficientStock {
                variant_id: item.variant_id.to_string(),
                requested: item.quantity,
                available: item.available_stock,
            }
            .into());
        }
    }

    let address = addresses::find(&state.db, &user.id, &request.address_id)
        .await?
        .ok_or_else(|| ApiError::not_found("address"))?;

    let coupon = match request.coupon_code.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => Some(
            coupons::find_by_code(&state.db, code, state.currency())
                .await?
                .ok_or_else(|| CommerceError::InvalidCoupon(code.to_string()))?,
        ),
        _ => None,
    };

    let pricing = cart.calculate_pricing(coupon.as_ref(), &state.shipping_policy(), timestamp)?;
    let mut order = Order::from_cart(
        &cart,
        &pricing,
        user.email.clone(),
        address.address,
        request.payment_method,
        now,
    )?;
    order.note = note;

    if order.payment_method == PaymentMethod::Online && order.grand_total.is_zero() {
        order.mark_paid(timestamp)?;
    }
    let needs_gateway = order.payment_method == PaymentMethod::Online && !order.is_paid();

    let mut tx = state.db.begin().await?;
    for item in &order.items {
        if !catalog::reserve_stock(&mut tx, &item.variant_id, item.quantity, timestamp).await? {
            let available = catalog::stock_in_tx(&mut tx, &item.variant_id).await?;
            return Err(CommerceError::InsufficientStock {
                variant_id: item.variant_id.to_string(),
                requested: item.quantity,
                available,
            }
            .into());
        }
    }
    orders::insert(&mut tx, &order).await?;
    let redeemed = match (&coupon, &pricing.coupon_code) {
        (Some(coupon), Some(_)) => {
            if !coupons::increment_usage(&mut tx, &coupon.id, timestamp).await? {
                return Err(CommerceError::CouponExhausted(coupon.code.clone()).into());
            }
            Some(coupon)
        }
        _ => None,
    };
    if !needs_gateway {
        cart_repo::clear_in_tx(&mut tx, &user.id).await?;
    }
    tx.commit().await?;

    info!(
        order_id = %order.id,
        order_number = %order.order_number,
        total = order.grand_total.amount_cents,
        method = order.payment_method.as_str(),
        "order placed"
    );

    if !needs_gateway {
        return Ok(CheckoutResult {
            order,
            payment: None,
        });
    }

    let gateway_order = match state
        .gateway
        .create_order(order.grand_total, &order.order_number)
        .await
    {
        Ok(gateway_order) => gateway_order,
        Err(e) => {
            warn!(order_id = %order.id, error = %e, "gateway order failed, cancelling");
            order_service::apply_transition(state, &mut order, OrderStatus::Cancelled, None)
                .await?;
            if let Some(coupon) = redeemed {
                coupons::release_usage(&state.db, &coupon.id, current_timestamp()).await?;
            }
            return Err(e.into());
        }
    };

    let payment = PaymentRecord::new(
        order.id.clone(),
        state.gateway.provider(),
        gateway_order.id.clone(),
        order.grand_total,
    );
    payments::insert(&state.db, &payment).await?;
    for item in &order.items {
        cart_repo::remove(&state.db, &user.id, &item.variant_id).await?;
    }

    Ok(CheckoutResult {
        payment: Some(PaymentIntent {
            provider: payment.provider,
            key_id: state.gateway.key_id().to_string(),
            gateway_order_id: gateway_order.id,
            amount: order.grand_total.amount_cents,
            currency: order.grand_total.currency.code().to_string(),
        }),
        order,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_note() {
        assert_eq!(clean_note(None).unwrap(), None);
        assert_eq!(clean_note(Some("   ".into())).unwrap(), None);
        assert_eq!(
            clean_note(Some(" leave at door ".into())).unwrap().as_deref(),
            Some("leave at door")
        );
        assert!(clean_note(Some("x".repeat(501))).is_err());
    }

    #[test]
    fn test_request_defaults() {
        let request: CheckoutRequest = serde_json::from_str(r#"{"address_id":"a-1"}"#).unwrap();
        assert_eq!(request.payment_method, PaymentMethod::Online);
        assert!(request.coupon_code.is_none());

        let request: CheckoutRequest =
            serde_json::from_str(r#"{"address_id":"a-1","payment_method":"cod"}"#).unwrap();
        assert_eq!(request.payment_method, PaymentMethod::CashOnDelivery);
    }
}
