//! Checkout and the customer's order history.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use maison_commerce::checkout::{Order, OrderStatus};
use maison_commerce::search::SearchResults;
use maison_commerce::{CommerceError, OrderId};

use super::PageParams;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery, CurrentUser};
use crate::repo::orders;
use crate::services::checkout::{self, CheckoutRequest, CheckoutResult};
use crate::services::orders as order_service;
use crate::state::AppState;

pub async fn place_order(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiJson(request): ApiJson<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResult>), ApiError> {
    let result = checkout::place_order(&state, &current.user, request).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

pub async fn list_orders(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Json<SearchResults<Order>>, ApiError> {
    let page = orders::list_for_user(
        &state.db,
        &current.user.id,
        params.page(),
        params.per_page(10),
    )
    .await?;
    Ok(Json(page))
}

/// Someone else's order is reported as missing.
async fn own_order(state: &AppState, current: &CurrentUser, id: &OrderId) -> Result<Order, ApiError> {
    orders::find(&state.db, id)
        .await?
        .filter(|order| order.user_id == current.user.id)
        .ok_or_else(|| CommerceError::OrderNotFound(id.to_string()).into())
}

pub async fn get_order(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>, ApiError> {
    Ok(Json(own_order(&state, &current, &id).await?))
}

/// Customers may cancel until the order is being processed.
pub async fn cancel_order(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>, ApiError> {
    let mut order = own_order(&state, &current, &id).await?;
    if !order.status.customer_can_cancel() {
        return Err(CommerceError::InvalidStatusTransition {
            from: order.status.as_str().to_string(),
            to: OrderStatus::Cancelled.as_str().to_string(),
        }
        .into());
    }
    order_service::cancel(&state, &mut order).await?;
    Ok(Json(order))
}
