//! Server-side cart lines.

use maison_commerce::{UserId, VariantId};
use maison_db::{params, Db, DbError, Transaction};
use serde::Deserialize;

/// A stored cart line, before it is priced.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CartLine {
    pub variant_id: VariantId,
    pub quantity: i64,
    pub added_at: i64,
}

/// Lines in the order they were first added.
pub async fn list_lines(db: &Db, user_id: &UserId) -> Result<Vec<CartLine>, DbError> {
    db.query_as(
        "SELECT variant_id, quantity, added_at FROM cart_items
         WHERE user_id = ? ORDER BY added_at ASC, variant_id ASC",
        params![user_id],
    )
    .await
}

/// Insert the line or overwrite its quantity.
pub async fn set_quantity(
    db: &Db,
    user_id: &UserId,
    variant_id: &VariantId,
    quantity: i64,
    now: i64,
) -> Result<(), DbError> {
    db.execute(
        "INSERT INTO cart_items (user_id, variant_id, quantity, added_at) VALUES (?, ?, ?, ?)
         ON CONFLICT(user_id, variant_id) DO UPDATE SET quantity = excluded.quantity",
        params![user_id, variant_id, quantity, now],
    )
    .await?;
    Ok(())
}

pub async fn remove(db: &Db, user_id: &UserId, variant_id: &VariantId) -> Result<bool, DbError> {
    let removed = db
        .execute(
            "DELETE FROM cart_items WHERE user_id = ? AND variant_id = ?",
            params![user_id, variant_id],
        )
        .await?;
    Ok(removed > 0)
}

pub async fn clear(db: &Db, user_id: &UserId) -> Result<u64, DbError> {
    db.execute("DELETE FROM cart_items WHERE user_id = ?", params![user_id])
        .await
}

pub async fn clear_in_tx(tx: &mut Transaction, user_id: &UserId) -> Result<u64, DbError> {
    tx.execute("DELETE FROM cart_items WHERE user_id = ?", params![user_id])
        .await
}
