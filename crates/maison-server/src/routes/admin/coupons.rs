use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use maison_commerce::cart::{normalize_code, Coupon, CouponKind};
use maison_commerce::{current_timestamp, Currency, CouponId, Money};
use serde::Deserialize;
use tracing::info;

use crate::error::ApiError;
use crate::extract::{AdminUser, ApiJson};
use crate::repo::coupons;
use crate::state::AppState;

/// Editable coupon fields. Amounts are in minor units.
#[derive(Debug, Deserialize)]
pub struct CouponInput {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    pub kind: CouponKind,
    pub value: i64,
    #[serde(default)]
    pub min_order_cents: i64,
    #[serde(default)]
    pub max_discount_cents: Option<i64>,
    #[serde(default)]
    pub usage_limit: Option<i64>,
    #[serde(default)]
    pub starts_at: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default = "enabled")]
    pub active: bool,
}

fn enabled() -> bool {
    true
}

impl CouponInput {
    fn apply(self, coupon: &mut Coupon, currency: Currency) {
        coupon.code = normalize_code(&self.code);
        coupon.description = self.description.filter(|d| !d.trim().is_empty());
        coupon.kind = self.kind;
        coupon.value = self.value;
        coupon.min_order = Money::new(self.min_order_cents, currency);
        coupon.max_discount = self.max_discount_cents.map(|c| Money::new(c, currency));
        coupon.usage_limit = self.usage_limit;
        coupon.starts_at = self.starts_at;
        coupon.expires_at = self.expires_at;
        coupon.active = self.active;
    }
}

pub async fn list_coupons(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<Coupon>>, ApiError> {
    Ok(Json(coupons::list(&state.db, state.currency()).await?))
}

pub async fn create_coupon(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiJson(input): ApiJson<CouponInput>,
) -> Result<(StatusCode, Json<Coupon>), ApiError> {
    let currency = state.currency();
    let mut coupon = Coupon::percentage("", 0, currency);
    input.apply(&mut coupon, currency);
    coupon.validate_definition()?;
    coupons::insert(&state.db, &coupon).await?;

    info!(coupon_id = %coupon.id, code = %coupon.code, kind = coupon.kind.as_str(), "coupon created");
    Ok((StatusCode::CREATED, Json(coupon)))
}

/// Redemptions already counted are kept.
pub async fn update_coupon(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<CouponId>,
    ApiJson(input): ApiJson<CouponInput>,
) -> Result<Json<Coupon>, ApiError> {
    let currency = state.currency();
    let mut coupon = coupons::find(&state.db, &id, currency)
        .await?
        .ok_or_else(|| ApiError::not_found("coupon"))?;
    input.apply(&mut coupon, currency);
    coupon.updated_at = current_timestamp();
    coupon.validate_definition()?;
    coupons::update(&state.db, &coupon).await?;
    Ok(Json(coupon))
}

pub async fn delete_coupon(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<CouponId>,
) -> Result<StatusCode, ApiError> {
    if coupons::delete(&state.db, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("coupon"))
    }
}
