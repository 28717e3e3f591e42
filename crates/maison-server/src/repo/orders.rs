//! Orders and their items.

use std::collections::BTreeMap;

use maison_commerce::checkout::{Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus};
use maison_commerce::search::{Pagination, SearchResults};
use maison_commerce::{Money, OrderId, OrderItemId, ProductId, UserId, VariantId};
use maison_db::{params, Db, DbError, Transaction, Value};
use serde::Deserialize;

use super::{corrupt, parse_currency, parse_json, to_json};

#[derive(Deserialize)]
struct OrderRow {
    id: String,
    order_number: String,
    user_id: String,
    email: String,
    status: String,
    payment_status: String,
    payment_method: String,
    shipping_address: String,
    subtotal_cents: i64,
    discount_cents: i64,
    shipping_cents: i64,
    total_cents: i64,
    currency: String,
    coupon_code: Option<String>,
    note: Option<String>,
    tracking_number: Option<String>,
    created_at: i64,
    updated_at: i64,
    cancelled_at: Option<i64>,
}

#[derive(Deserialize)]
struct OrderItemRow {
    id: String,
    product_id: String,
    variant_id: String,
    sku: String,
    name: String,
    size: Option<String>,
    color: Option<String>,
    quantity: i64,
    unit_price_cents: i64,
    total_cents: i64,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItemRow>) -> Result<Order, DbError> {
        let currency = parse_currency(&self.currency)?;
        let money = |cents| Money::new(cents, currency);
        let status =
            OrderStatus::from_str(&self.status).ok_or_else(|| corrupt("status", &self.status))?;
        let payment_status = PaymentStatus::from_str(&self.payment_status)
            .ok_or_else(|| corrupt("payment_status", &self.payment_status))?;
        let payment_method = PaymentMethod::from_str(&self.payment_method)
            .ok_or_else(|| corrupt("payment_method", &self.payment_method))?;

        Ok(Order {
            id: OrderId::new(self.id),
            order_number: self.order_number,
            user_id: UserId::new(self.user_id),
            email: self.email,
            status,
            payment_status,
            payment_method,
            items: items
                .into_iter()
                .map(|item| OrderItem {
                    id: OrderItemId::new(item.id),
                    product_id: ProductId::new(item.product_id),
                    variant_id: VariantId::new(item.variant_id),
                    sku: item.sku,
                    name: item.name,
                    size: item.size,
                    color: item.color,
                    quantity: item.quantity,
                    unit_price: money(item.unit_price_cents),
                    total_price: money(item.total_cents),
                })
                .collect(),
            shipping_address: parse_json("shipping_address", &self.shipping_address)?,
            subtotal: money(self.subtotal_cents),
            discount_total: money(self.discount_cents),
            shipping_total: money(self.shipping_cents),
            grand_total: money(self.total_cents),
            currency,
            coupon_code: self.coupon_code,
            note: self.note,
            tracking_number: self.tracking_number,
            created_at: self.created_at,
            updated_at: self.updated_at,
            cancelled_at: self.cancelled_at,
        })
    }
}

const SELECT_ITEMS: &str = "SELECT id, product_id, variant_id, sku, name, size, color, quantity,
        unit_price_cents, total_cents
     FROM order_items WHERE order_id = ? ORDER BY rowid ASC";

/// Write an order and all of its items.
pub async fn insert(tx: &mut Transaction, order: &Order) -> Result<(), DbError> {
    tx.execute(
        "INSERT INTO orders
             (id, order_number, user_id, email, status, payment_status, payment_method,
              shipping_address, subtotal_cents, discount_cents, shipping_cents, total_cents,
              currency, coupon_code, note, tracking_number, created_at, updated_at, cancelled_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            &order.id,
            &order.order_number,
            &order.user_id,
            &order.email,
            order.status.as_str(),
            order.payment_status.as_str(),
            order.payment_method.as_str(),
            to_json(&order.shipping_address)?,
            order.subtotal.amount_cents,
            order.discount_total.amount_cents,
            order.shipping_total.amount_cents,
            order.grand_total.amount_cents,
            order.currency.code(),
            order.coupon_code.as_ref(),
            order.note.as_ref(),
            order.tracking_number.as_ref(),
            order.created_at,
            order.updated_at,
            order.cancelled_at
        ],
    )
    .await?;

    for item in &order.items {
        tx.execute(
            "INSERT INTO order_items
                 (id, order_id, product_id, variant_id, sku, name, size, color, quantity,
                  unit_price_cents, total_cents)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                &item.id,
                &order.id,
                &item.product_id,
                &item.variant_id,
                &item.sku,
                &item.name,
                item.size.as_ref(),
                item.color.as_ref(),
                item.quantity,
                item.unit_price.amount_cents,
                item.total_price.amount_cents
            ],
        )
        .await?;
    }
    Ok(())
}

async fn with_items(db: &Db, row: OrderRow) -> Result<Order, DbError> {
    let items: Vec<OrderItemRow> = db.query_as(SELECT_ITEMS, params![&row.id]).await?;
    row.into_order(items)
}

pub async fn find(db: &Db, id: &OrderId) -> Result<Option<Order>, DbError> {
    let row: Option<OrderRow> = db
        .query_optional("SELECT * FROM orders WHERE id = ?", params![id])
        .await?;
    match row {
        Some(row) => Ok(Some(with_items(db, row).await?)),
        None => Ok(None),
    }
}

async fn page(
    db: &Db,
    where_clause: &str,
    values: Vec<Value>,
    page: i64,
    per_page: i64,
) -> Result<SearchResults<Order>, DbError> {
    let page = page.max(1);
    let per_page = per_page.clamp(1, 100);
    let total = db
        .scalar_i64(
            &format!("SELECT COUNT(*) FROM orders WHERE {where_clause}"),
            &values,
        )
        .await?;
    let pagination = Pagination::new(page, per_page, total);
    let sql = format!(
        "SELECT * FROM orders WHERE {where_clause}
         ORDER BY created_at DESC, id ASC LIMIT {per_page} OFFSET {}",
        pagination.offset()
    );
    let rows: Vec<OrderRow> = db.query_as(&sql, &values).await?;

    let mut orders = Vec::with_capacity(rows.len());
    for row in rows {
        orders.push(with_items(db, row).await?);
    }
    Ok(SearchResults::new(orders, pagination))
}

/// A customer's orders, newest first.
pub async fn list_for_user(
    db: &Db,
    user_id: &UserId,
    page_number: i64,
    per_page: i64,
) -> Result<SearchResults<Order>, DbError> {
    page(db, "user_id = ?", vec![user_id.into()], page_number, per_page).await
}

/// Every order, optionally restricted to one status.
pub async fn list_all(
    db: &Db,
    status: Option<OrderStatus>,
    page_number: i64,
    per_page: i64,
) -> Result<SearchResults<Order>, DbError> {
    match status {
        Some(status) => {
            page(
                db,
                "status = ?",
                vec![status.as_str().into()],
                page_number,
                per_page,
            )
            .await
        }
        None => page(db, "1=1", Vec::new(), page_number, per_page).await,
    }
}

/// Persist status, payment status, tracking and timestamps of `order`,
/// but only if the stored status is still `expected`.
///
/// Returns `false` when another request moved the order first.
pub async fn save_state(
    tx: &mut Transaction,
    order: &Order,
    expected: OrderStatus,
) -> Result<bool, DbError> {
    let updated = tx
        .execute(
            "UPDATE orders SET status = ?, payment_status = ?, tracking_number = ?,
                 updated_at = ?, cancelled_at = ?
             WHERE id = ? AND status = ?",
            params![
                order.status.as_str(),
                order.payment_status.as_str(),
                order.tracking_number.as_ref(),
                order.updated_at,
                order.cancelled_at,
                &order.id,
                expected.as_str()
            ],
        )
        .await?;
    Ok(updated == 1)
}

/// Order counts keyed by status name. Every status is present.
pub async fn count_by_status(db: &Db) -> Result<BTreeMap<String, i64>, DbError> {
    #[derive(Deserialize)]
    struct StatusCount {
        status: String,
        count: i64,
    }

    let rows: Vec<StatusCount> = db
        .query_as(
            "SELECT status, COUNT(*) AS count FROM orders GROUP BY status",
            &[],
        )
        .await?;

    let mut counts: BTreeMap<String, i64> = OrderStatus::all()
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();
    for row in rows {
        counts.insert(row.status, row.count);
    }
    Ok(counts)
}

/// Sum of totals of paid orders, in minor units.
pub async fn paid_revenue(db: &Db) -> Result<i64, DbError> {
    db.scalar_i64(
        "SELECT COALESCE(SUM(total_cents), 0) FROM orders WHERE payment_status = 'paid'",
        &[],
    )
    .await
}

/// Whether the user has a delivered order containing the product.
pub async fn user_has_delivered_product(
    db: &Db,
    user_id: &UserId,
    product_id: &ProductId,
) -> Result<bool, DbError> {
    let count = db
        .scalar_i64(
            "SELECT COUNT(*) FROM orders o JOIN order_items i ON i.order_id = o.id
             WHERE o.user_id = ? AND i.product_id = ? AND o.status = 'delivered'",
            params![user_id, product_id],
        )
        .await?;
    Ok(count > 0)
}
