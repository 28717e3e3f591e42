//! The signed-in customer's cart.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use maison_commerce::cart::{Cart, CartPricing, LineItem};
use maison_commerce::{current_timestamp, CommerceError, VariantId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::extract::{ApiJson, CurrentUser};
use crate::repo::{cart as cart_repo, catalog};
use crate::services::cart::load_cart;
use crate::state::AppState;

/// A cart priced without a coupon.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub cart: Cart,
    pub pricing: CartPricing,
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub variant_id: VariantId,
    #[serde(default = "one")]
    pub quantity: i64,
}

fn one() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i64,
}

pub(crate) fn price(state: &AppState, cart: Cart) -> Result<CartView, ApiError> {
    let pricing = cart.calculate_pricing(None, &state.shipping_policy(), current_timestamp())?;
    Ok(CartView { cart, pricing })
}

async fn view(state: &AppState, current: &CurrentUser) -> Result<Json<CartView>, ApiError> {
    let cart = load_cart(state, &current.user.id).await?;
    Ok(Json(price(state, cart)?))
}

pub async fn get_cart(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<CartView>, ApiError> {
    view(&state, &current).await
}

/// Add units of a variant, merging with an existing line.
pub async fn add_item(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiJson(request): ApiJson<AddItemRequest>,
) -> Result<Json<CartView>, ApiError> {
    let (product, variant) = catalog::find_variant_with_product(&state.db, &request.variant_id)
        .await?
        .ok_or_else(|| CommerceError::VariantNotFound(request.variant_id.to_string()))?;
    if !product.is_available() {
        return Err(ApiError::validation(format!(
            "{} is not available",
            product.name
        )));
    }

    let mut cart = load_cart(&state, &current.user.id).await?;
    let quantity = cart.add_item(LineItem::new(&product, &variant, request.quantity)?)?;
    if !variant.can_fulfill(quantity) {
        return Err(CommerceError::InsufficientStock {
            variant_id: variant.id.to_string(),
            requested: quantity,
            available: variant.stock,
        }
        .into());
    }

    cart_repo::set_quantity(
        &state.db,
        &current.user.id,
        &variant.id,
        quantity,
        current_timestamp(),
    )
    .await?;
    debug!(user_id = %current.user.id, variant_id = %variant.id, quantity, "cart line set");
    Ok(Json(price(&state, cart)?))
}

/// Set a line's quantity; zero or less removes it.
pub async fn update_item(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(variant_id): Path<VariantId>,
    ApiJson(request): ApiJson<UpdateItemRequest>,
) -> Result<Json<CartView>, ApiError> {
    let user_id = &current.user.id;
    let mut cart = load_cart(&state, user_id).await?;
    let available = cart
        .get_item(&variant_id)
        .map(|item| item.available_stock)
        .ok_or_else(|| CommerceError::ItemNotInCart(variant_id.to_string()))?;

    cart.update_quantity(&variant_id, request.quantity)?;
    if request.quantity <= 0 {
        cart_repo::remove(&state.db, user_id, &variant_id).await?;
    } else {
        if request.quantity > available {
            return Err(CommerceError::InsufficientStock {
                variant_id: variant_id.to_string(),
                requested: request.quantity,
                available,
            }
            .into());
        }
        cart_repo::set_quantity(
            &state.db,
            user_id,
            &variant_id,
            request.quantity,
            current_timestamp(),
        )
        .await?;
    }
    Ok(Json(price(&state, cart)?))
}

pub async fn remove_item(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(variant_id): Path<VariantId>,
) -> Result<Json<CartView>, ApiError> {
    if !cart_repo::remove(&state.db, &current.user.id, &variant_id).await? {
        return Err(CommerceError::ItemNotInCart(variant_id.to_string()).into());
    }
    view(&state, &current).await
}

pub async fn clear_cart(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<StatusCode, ApiError> {
    cart_repo::clear(&state.db, &current.user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
