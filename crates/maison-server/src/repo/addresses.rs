//! Saved shipping addresses.
//!
//! A user's first address becomes the default. Deleting the default
//! promotes the most recently created remaining address.

use maison_commerce::checkout::Address;
use maison_commerce::{AddressId, UserId};
use maison_db::{params, Db, DbError, Transaction};
use serde::{Deserialize, Serialize};

/// An address in a user's address book.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedAddress {
    pub id: AddressId,
    #[serde(flatten)]
    pub address: Address,
    pub is_default: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Deserialize)]
struct AddressRow {
    id: String,
    full_name: String,
    phone: String,
    line1: String,
    line2: Option<String>,
    city: String,
    state: String,
    postal_code: String,
    country: String,
    is_default: i64,
    created_at: i64,
    updated_at: i64,
}

impl From<AddressRow> for SavedAddress {
    fn from(row: AddressRow) -> Self {
        SavedAddress {
            id: AddressId::new(row.id),
            address: Address {
                full_name: row.full_name,
                phone: row.phone,
                line1: row.line1,
                line2: row.line2,
                city: row.city,
                state: row.state,
                postal_code: row.postal_code,
                country: row.country,
            },
            is_default: row.is_default != 0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Default first, then newest.
pub async fn list(db: &Db, user_id: &UserId) -> Result<Vec<SavedAddress>, DbError> {
    let rows: Vec<AddressRow> = db
        .query_as(
            "SELECT * FROM addresses WHERE user_id = ?
             ORDER BY is_default DESC, created_at DESC, id ASC",
            params![user_id],
        )
        .await?;
    Ok(rows.into_iter().map(SavedAddress::from).collect())
}

pub async fn find(
    db: &Db,
    user_id: &UserId,
    id: &AddressId,
) -> Result<Option<SavedAddress>, DbError> {
    let row: Option<AddressRow> = db
        .query_optional(
            "SELECT * FROM addresses WHERE id = ? AND user_id = ?",
            params![id, user_id],
        )
        .await?;
    Ok(row.map(SavedAddress::from))
}

/// Save a new address; it becomes the default if the user had none.
pub async fn create(
    db: &Db,
    user_id: &UserId,
    address: Address,
    now: i64,
) -> Result<SavedAddress, DbError> {
    let mut tx = db.begin().await?;
    let existing = tx
        .scalar_i64(
            "SELECT COUNT(*) FROM addresses WHERE user_id = ?",
            params![user_id],
        )
        .await?;

    let saved = SavedAddress {
        id: AddressId::generate(),
        address,
        is_default: existing == 0,
        created_at: now,
        updated_at: now,
    };
    let a = &saved.address;
    tx.execute(
        "INSERT INTO addresses
             (id, user_id, full_name, phone, line1, line2, city, state, postal_code, country,
              is_default, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            &saved.id,
            user_id,
            &a.full_name,
            &a.phone,
            &a.line1,
            a.line2.as_ref(),
            &a.city,
            &a.state,
            &a.postal_code,
            &a.country,
            saved.is_default,
            now,
            now
        ],
    )
    .await?;
    tx.commit().await?;
    Ok(saved)
}

pub async fn update(
    db: &Db,
    user_id: &UserId,
    id: &AddressId,
    address: &Address,
    now: i64,
) -> Result<bool, DbError> {
    let updated = db
        .execute(
            "UPDATE addresses SET full_name = ?, phone = ?, line1 = ?, line2 = ?, city = ?,
                 state = ?, postal_code = ?, country = ?, updated_at = ?
             WHERE id = ? AND user_id = ?",
            params![
                &address.full_name,
                &address.phone,
                &address.line1,
                address.line2.as_ref(),
                &address.city,
                &address.state,
                &address.postal_code,
                &address.country,
                now,
                id,
                user_id
            ],
        )
        .await?;
    Ok(updated > 0)
}

/// Delete an address, promoting another one if it was the default.
pub async fn delete(db: &Db, user_id: &UserId, id: &AddressId) -> Result<bool, DbError> {
    let mut tx = db.begin().await?;
    let was_default = tx
        .scalar_i64(
            "SELECT is_default FROM addresses WHERE id = ? AND user_id = ?",
            params![id, user_id],
        )
        .await?
        != 0;
    let removed = tx
        .execute(
            "DELETE FROM addresses WHERE id = ? AND user_id = ?",
            params![id, user_id],
        )
        .await?;
    if removed == 0 {
        return Ok(false);
    }
    if was_default {
        promote_newest(&mut tx, user_id).await?;
    }
    tx.commit().await?;
    Ok(true)
}

async fn promote_newest(tx: &mut Transaction, user_id: &UserId) -> Result<(), DbError> {
    tx.execute(
        "UPDATE addresses SET is_default = 1
         WHERE id = (SELECT id FROM addresses WHERE user_id = ?
                     ORDER BY created_at DESC, id DESC LIMIT 1)",
        params![user_id],
    )
    .await?;
    Ok(())
}

/// Make `id` the user's only default address.
pub async fn set_default(
    db: &Db,
    user_id: &UserId,
    id: &AddressId,
    now: i64,
) -> Result<bool, DbError> {
    let mut tx = db.begin().await?;
    let exists = tx
        .scalar_i64(
            "SELECT COUNT(*) FROM addresses WHERE id = ? AND user_id = ?",
            params![id, user_id],
        )
        .await?;
    if exists == 0 {
        return Ok(false);
    }
    tx.execute(
        "UPDATE addresses SET is_default = 0 WHERE user_id = ? AND is_default = 1",
        params![user_id],
    )
    .await?;
    tx.execute(
        "UPDATE addresses SET is_default = 1, updated_at = ? WHERE id = ?",
        params![now, id],
    )
    .await?;
    tx.commit().await?;
    Ok(true)
}
