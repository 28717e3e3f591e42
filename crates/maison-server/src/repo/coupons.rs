//! Coupon codes.
//!
//! Money columns are stored without a currency; coupons are read back in
//! the store currency.

use maison_commerce::cart::{normalize_code, Coupon, CouponKind};
use maison_commerce::{CouponId, Currency, Money};
use maison_db::{params, Db, DbError, Transaction};
use serde::Deserialize;

use super::corrupt;

#[derive(Deserialize)]
struct CouponRow {
    id: String,
    code: String,
    description: Option<String>,
    kind: String,
    value: i64,
    min_order_cents: i64,
    max_discount_cents: Option<i64>,
    usage_limit: Option<i64>,
    usage_count: i64,
    starts_at: Option<i64>,
    expires_at: Option<i64>,
    active: i64,
    created_at: i64,
    updated_at: i64,
}

impl CouponRow {
    fn into_coupon(self, currency: Currency) -> Result<Coupon, DbError> {
        let kind = CouponKind::from_str(&self.kind).ok_or_else(|| corrupt("kind", &self.kind))?;
        Ok(Coupon {
            id: CouponId::new(self.id),
            code: self.code,
            description: self.description,
            kind,
            value: self.value,
            min_order: Money::new(self.min_order_cents, currency),
            max_discount: self.max_discount_cents.map(|c| Money::new(c, currency)),
            usage_limit: self.usage_limit,
            usage_count: self.usage_count,
            starts_at: self.starts_at,
            expires_at: self.expires_at,
            active: self.active != 0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

pub async fn list(db: &Db, currency: Currency) -> Result<Vec<Coupon>, DbError> {
    let rows: Vec<CouponRow> = db
        .query_as("SELECT * FROM coupons ORDER BY created_at DESC, code ASC", &[])
        .await?;
    rows.into_iter().map(|r| r.into_coupon(currency)).collect()
}

pub async fn find(db: &Db, id: &CouponId, currency: Currency) -> Result<Option<Coupon>, DbError> {
    db.query_optional::<CouponRow>("SELECT * FROM coupons WHERE id = ?", params![id])
        .await?
        .map(|r| r.into_coupon(currency))
        .transpose()
}

/// Look up a code as a customer typed it.
pub async fn find_by_code(
    db: &Db,
    code: &str,
    currency: Currency,
) -> Result<Option<Coupon>, DbError> {
    db.query_optional::<CouponRow>(
        "SELECT * FROM coupons WHERE code = ?",
        params![normalize_code(code)],
    )
    .await?
    .map(|r| r.into_coupon(currency))
    .transpose()
}

pub async fn insert(db: &Db, coupon: &Coupon) -> Result<(), DbError> {
    db.execute(
        "INSERT INTO coupons
             (id, code, description, kind, value, min_order_cents, max_discount_cents,
              usage_limit, usage_count, starts_at, expires_at, active, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            &coupon.id,
            &coupon.code,
            coupon.description.as_ref(),
            coupon.kind.as_str(),
            coupon.value,
            coupon.min_order.amount_cents,
            coupon.max_discount.map(|m| m.amount_cents),
            coupon.usage_limit,
            coupon.usage_count,
            coupon.starts_at,
            coupon.expires_at,
            coupon.active,
            coupon.created_at,
            coupon.updated_at
        ],
    )
    .await?;
    Ok(())
}

/// Save an edited definition. The usage count is never overwritten.
pub async fn update(db: &Db, coupon: &Coupon) -> Result<(), DbError> {
    let updated = db
        .execute(
            "UPDATE coupons SET code = ?, description = ?, kind = ?, value = ?,
                 min_order_cents = ?, max_discount_cents = ?, usage_limit = ?,
                 starts_at = ?, expires_at = ?, active = ?, updated_at = ?
             WHERE id = ?",
            params![
                &coupon.code,
                coupon.description.as_ref(),
                coupon.kind.as_str(),
                coupon.value,
                coupon.min_order.amount_cents,
                coupon.max_discount.map(|m| m.amount_cents),
                coupon.usage_limit,
                coupon.starts_at,
                coupon.expires_at,
                coupon.active,
                coupon.updated_at,
                &coupon.id
            ],
        )
        .await?;
    if updated == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

pub async fn delete(db: &Db, id: &CouponId) -> Result<bool, DbError> {
    let removed = db
        .execute("DELETE FROM coupons WHERE id = ?", params![id])
        .await?;
    Ok(removed > 0)
}

/// Count one redemption unless the limit has been reached meanwhile.
pub async fn increment_usage(
    tx: &mut Transaction,
    id: &CouponId,
    now: i64,
) -> Result<bool, DbError> {
    let updated = tx
        .execute(
            "UPDATE coupons SET usage_count = usage_count + 1, updated_at = ?
             WHERE id = ? AND (usage_limit IS NULL OR usage_count < usage_limit)",
            params![now, id],
        )
        .await?;
    Ok(updated == 1)
}

/// Give back a redemption whose order never became payable.
pub async fn release_usage(db: &Db, id: &CouponId, now: i64) -> Result<bool, DbError> {
    let updated = db
        .execute(
            "UPDATE coupons SET usage_count = usage_count - 1, updated_at = ?
             WHERE id = ? AND usage_count > 0",
            params![now, id],
        )
        .await?;
    Ok(updated == 1)
}
