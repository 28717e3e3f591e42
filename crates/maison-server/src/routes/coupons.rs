//! Coupon preview against the current cart.

use axum::extract::State;
use axum::Json;
use maison_commerce::cart::CartPricing;
use maison_commerce::{current_timestamp, CommerceError, Money};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::extract::{ApiJson, CurrentUser};
use crate::repo::coupons;
use crate::services::cart::load_cart;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ValidateCouponRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct CouponPreview {
    pub code: String,
    pub discount: Money,
    pub pricing: CartPricing,
}

/// Price the cart with a code without reserving a use of it.
pub async fn validate_coupon(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiJson(request): ApiJson<ValidateCouponRequest>,
) -> Result<Json<CouponPreview>, ApiError> {
    let cart = load_cart(&state, &current.user.id).await?;
    if cart.is_empty() {
        return Err(ApiError::validation("cart is empty"));
    }

    let coupon = coupons::find_by_code(&state.db, &request.code, state.currency())
        .await?
        .ok_or_else(|| CommerceError::InvalidCoupon(request.code.trim().to_string()))?;
    let pricing =
        cart.calculate_pricing(Some(&coupon), &state.shipping_policy(), current_timestamp())?;

    Ok(Json(CouponPreview {
        code: coupon.code,
        discount: pricing.discount_total,
        pricing,
    }))
}
