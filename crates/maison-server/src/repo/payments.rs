//! Gateway payment attempts.

use maison_commerce::payment::{PaymentRecord, PaymentRecordStatus};
use maison_commerce::{Money, OrderId, PaymentId};
use maison_db::{params, Db, DbError, Transaction};
use serde::Deserialize;

use super::{corrupt, parse_currency};

#[derive(Deserialize)]
struct PaymentRow {
    id: String,
    order_id: String,
    provider: String,
    gateway_order_id: String,
    gateway_payment_id: Option<String>,
    amount_cents: i64,
    currency: String,
    status: String,
    signature: Option<String>,
    failure_reason: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<PaymentRow> for PaymentRecord {
    type Error = DbError;

    fn try_from(row: PaymentRow) -> Result<Self, DbError> {
        let currency = parse_currency(&row.currency)?;
        let status = PaymentRecordStatus::from_str(&row.status)
            .ok_or_else(|| corrupt("status", &row.status))?;
        Ok(PaymentRecord {
            id: PaymentId::new(row.id),
            order_id: OrderId::new(row.order_id),
            provider: row.provider,
            gateway_order_id: row.gateway_order_id,
            gateway_payment_id: row.gateway_payment_id,
            amount: Money::new(row.amount_cents, currency),
            status,
            signature: row.signature,
            failure_reason: row.failure_reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub async fn insert(db: &Db, payment: &PaymentRecord) -> Result<(), DbError> {
    db.execute(
        "INSERT INTO payments
             (id, order_id, provider, gateway_order_id, gateway_payment_id, amount_cents,
              currency, status, signature, failure_reason, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            &payment.id,
            &payment.order_id,
            &payment.provider,
            &payment.gateway_order_id,
            payment.gateway_payment_id.as_ref(),
            payment.amount.amount_cents,
            payment.amount.currency.code(),
            payment.status.as_str(),
            payment.signature.as_ref(),
            payment.failure_reason.as_ref(),
            payment.created_at,
            payment.updated_at
        ],
    )
    .await?;
    Ok(())
}

pub async fn find_by_gateway_order(
    db: &Db,
    gateway_order_id: &str,
) -> Result<Option<PaymentRecord>, DbError> {
    db.query_optional::<PaymentRow>(
        "SELECT * FROM payments WHERE gateway_order_id = ?",
        params![gateway_order_id],
    )
    .await?
    .map(PaymentRecord::try_from)
    .transpose()
}

/// Every attempt for an order, newest first.
pub async fn list_for_order(db: &Db, order_id: &OrderId) -> Result<Vec<PaymentRecord>, DbError> {
    let rows: Vec<PaymentRow> = db
        .query_as(
            "SELECT * FROM payments WHERE order_id = ? ORDER BY created_at DESC, rowid DESC",
            params![order_id],
        )
        .await?;
    rows.into_iter().map(PaymentRecord::try_from).collect()
}

/// The attempt that captured money for an order, if any.
pub async fn find_captured_for_order(
    db: &Db,
    order_id: &OrderId,
) -> Result<Option<PaymentRecord>, DbError> {
    db.query_optional::<PaymentRow>(
        "SELECT * FROM payments WHERE order_id = ? AND status = 'captured'
         ORDER BY updated_at DESC LIMIT 1",
        params![order_id],
    )
    .await?
    .map(PaymentRecord::try_from)
    .transpose()
}

/// Save the mutable fields of an attempt.
pub async fn save(tx: &mut Transaction, payment: &PaymentRecord) -> Result<(), DbError> {
    let updated = tx
        .execute(
            "UPDATE payments SET gateway_payment_id = ?, status = ?, signature = ?,
                 failure_reason = ?, updated_at = ?
             WHERE id = ?",
            params![
                payment.gateway_payment_id.as_ref(),
                payment.status.as_str(),
                payment.signature.as_ref(),
                payment.failure_reason.as_ref(),
                payment.updated_at,
                &payment.id
            ],
        )
        .await?;
    if updated == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
