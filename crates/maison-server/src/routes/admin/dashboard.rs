use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use maison_commerce::checkout::{Order, OrderStatus, PaymentStatus};
use maison_commerce::{Money, OrderId};
use serde::Serialize;

use crate::error::ApiError;
use crate::extract::AdminUser;
use crate::repo::catalog::{self, LowStockVariant};
use crate::repo::{orders, users};
use crate::state::AppState;

const RECENT_ORDERS: i64 = 5;
const LOW_STOCK_LIMIT: i64 = 20;

#[derive(Debug, Serialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub order_number: String,
    pub email: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub total: Money,
    pub created_at: i64,
}

impl From<Order> for OrderSummary {
    fn from(order: Order) -> Self {
        OrderSummary {
            id: order.id,
            order_number: order.order_number,
            email: order.email,
            status: order.status,
            payment_status: order.payment_status,
            total: order.grand_total,
            created_at: order.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub revenue: Money,
    pub orders_by_status: BTreeMap<String, i64>,
    pub total_orders: i64,
    pub product_count: i64,
    pub customer_count: i64,
    pub low_stock: Vec<LowStockVariant>,
    pub recent_orders: Vec<OrderSummary>,
}

pub async fn dashboard(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Dashboard>, ApiError> {
    let db = &state.db;
    let orders_by_status = orders::count_by_status(db).await?;
    let recent = orders::list_all(db, None, 1, RECENT_ORDERS).await?;

    Ok(Json(Dashboard {
        revenue: Money::new(orders::paid_revenue(db).await?, state.currency()),
        total_orders: orders_by_status.values().sum(),
        orders_by_status,
        product_count: catalog::count_products(db).await?,
        customer_count: users::count_customers(db).await?,
        low_stock: catalog::low_stock(db, state.config.store.low_stock_threshold, LOW_STOCK_LIMIT)
            .await?,
        recent_orders: recent.items.into_iter().map(OrderSummary::from).collect(),
    }))
}
