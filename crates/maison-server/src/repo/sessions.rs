//! Bearer sessions.

use maison_auth::AuthToken;
use maison_commerce::UserId;
use maison_db::{params, Db, DbError};
use serde::Deserialize;

#[derive(Deserialize)]
struct SessionRow {
    token: String,
    user_id: String,
    created_at: i64,
    expires_at: i64,
}

pub async fn create(db: &Db, token: &AuthToken) -> Result<(), DbError> {
    db.execute(
        "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
        params![&token.token, &token.user_id, token.created_at, token.expires_at],
    )
    .await?;
    Ok(())
}

pub async fn find(db: &Db, token: &str) -> Result<Option<AuthToken>, DbError> {
    let row: Option<SessionRow> = db
        .query_optional(
            "SELECT token, user_id, created_at, expires_at FROM sessions WHERE token = ?",
            params![token],
        )
        .await?;
    Ok(row.map(|r| AuthToken {
        token: r.token,
        user_id: UserId::new(r.user_id),
        created_at: r.created_at,
        expires_at: r.expires_at,
    }))
}

/// Returns whether a session was removed.
pub async fn delete(db: &Db, token: &str) -> Result<bool, DbError> {
    let removed = db
        .execute("DELETE FROM sessions WHERE token = ?", params![token])
        .await?;
    Ok(removed > 0)
}

pub async fn purge_expired(db: &Db, now: i64) -> Result<u64, DbError> {
    db.execute("DELETE FROM sessions WHERE expires_at <= ?", params![now])
        .await
}
