//! Order fulfilment.

use axum::extract::{Path, State};
use axum::Json;
use maison_commerce::checkout::{Order, OrderStatus};
use maison_commerce::payment::PaymentRecord;
use maison_commerce::search::SearchResults;
use maison_commerce::{CommerceError, OrderId};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::extract::{AdminUser, ApiJson, ApiQuery};
use crate::repo::{orders, payments};
use crate::services::orders as order_service;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AdminOrderParams {
    pub status: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AdminOrderDetail {
    pub order: Order,
    pub payments: Vec<PaymentRecord>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
    #[serde(default)]
    pub tracking_number: Option<String>,
}

pub async fn list_orders(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiQuery(params): ApiQuery<AdminOrderParams>,
) -> Result<Json<SearchResults<Order>>, ApiError> {
    let status = match params.status.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            OrderStatus::from_str(raw)
                .ok_or_else(|| ApiError::BadRequest(format!("unknown order status: {raw}")))?,
        ),
    };
    let page = orders::list_all(
        &state.db,
        status,
        params.page.unwrap_or(1),
        params.per_page.unwrap_or(20),
    )
    .await?;
    Ok(Json(page))
}

async fn load(state: &AppState, id: &OrderId) -> Result<Order, ApiError> {
    orders::find(&state.db, id)
        .await?
        .ok_or_else(|| CommerceError::OrderNotFound(id.to_string()).into())
}

pub async fn get_order(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<OrderId>,
) -> Result<Json<AdminOrderDetail>, ApiError> {
    let order = load(&state, &id).await?;
    let payments = payments::list_for_order(&state.db, &order.id).await?;
    Ok(Json(AdminOrderDetail { order, payments }))
}

/// Move an order along its lifecycle.
///
/// Cancelling restores stock and refunds a paid order; refunding goes
/// through the gateway for online payments.
pub async fn update_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<OrderId>,
    ApiJson(update): ApiJson<StatusUpdate>,
) -> Result<Json<Order>, ApiError> {
    let next = OrderStatus::from_str(&update.status)
        .ok_or_else(|| ApiError::validation(format!("unknown order status: {}", update.status)))?;
    let tracking_number = update
        .tracking_number
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    let mut order = load(&state, &id).await?;
    order_service::update_status(&state, &mut order, next, tracking_number).await?;

    info!(order_id = %order.id, status = order.status.as_str(), admin = %admin.id, "order updated by admin");
    Ok(Json(order))
}
