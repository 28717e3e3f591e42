//! Wishlist.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use maison_commerce::catalog::Product;
use maison_commerce::{current_timestamp, CommerceError, ProductId};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::extract::{ApiJson, CurrentUser};
use crate::repo::{catalog, engagement};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct WishlistEntry {
    pub product: Product,
    pub added_at: i64,
}

#[derive(Debug, Serialize)]
pub struct WishlistView {
    pub items: Vec<WishlistEntry>,
}

#[derive(Debug, Deserialize)]
pub struct AddToWishlistRequest {
    pub product_id: ProductId,
}

/// Saved products that are still on sale, newest first.
pub async fn get_wishlist(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<WishlistView>, ApiError> {
    let wishlist = engagement::load_wishlist(&state.db, &current.user.id).await?;
    let mut items = Vec::with_capacity(wishlist.items.len());
    for item in wishlist.items {
        if let Some(product) = catalog::find_product(&state.db, &item.product_id).await? {
            if product.is_available() {
                items.push(WishlistEntry {
                    product,
                    added_at: item.added_at,
                });
            }
        }
    }
    Ok(Json(WishlistView { items }))
}

/// 201 when newly saved, 200 when it was already there.
pub async fn add_to_wishlist(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiJson(request): ApiJson<AddToWishlistRequest>,
) -> Result<StatusCode, ApiError> {
    let available = catalog::find_product(&state.db, &request.product_id)
        .await?
        .is_some_and(|p| p.is_available());
    if !available {
        return Err(CommerceError::ProductNotFound(request.product_id.to_string()).into());
    }

    let added = engagement::add_to_wishlist(
        &state.db,
        &current.user.id,
        &request.product_id,
        current_timestamp(),
    )
    .await?;
    Ok(if added {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    })
}

pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(product_id): Path<ProductId>,
) -> Result<StatusCode, ApiError> {
    if engagement::remove_from_wishlist(&state.db, &current.user.id, &product_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("wishlist item"))
    }
}
