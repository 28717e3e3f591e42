//! User accounts.

use maison_auth::{Role, User, UserCredentials};
use maison_commerce::UserId;
use maison_db::{params, Db, DbError};
use serde::Deserialize;

use super::corrupt;

#[derive(Deserialize)]
struct UserRow {
    id: String,
    email: String,
    name: Option<String>,
    password_hash: String,
    role: String,
    created_at: i64,
}

impl UserRow {
    fn into_credentials(self) -> Result<UserCredentials, DbError> {
        let role: Role = self.role.parse().map_err(|_| corrupt("role", &self.role))?;
        Ok(UserCredentials {
            user: User {
                id: UserId::new(self.id),
                email: self.email,
                name: self.name,
                role,
                created_at: self.created_at,
            },
            password_hash: self.password_hash,
        })
    }
}

const SELECT_USER: &str =
    "SELECT id, email, name, password_hash, role, created_at FROM users";

/// Insert a new account. A taken email is a [`DbError::Conflict`].
pub async fn insert(db: &Db, credentials: &UserCredentials) -> Result<(), DbError> {
    let user = &credentials.user;
    db.execute(
        "INSERT INTO users (id, email, name, password_hash, role, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        params![
            &user.id,
            &user.email,
            user.name.clone(),
            &credentials.password_hash,
            user.role.as_str(),
            user.created_at,
            user.created_at
        ],
    )
    .await?;
    Ok(())
}

/// Create the account or, if the email exists, make it an admin with the
/// given password.
pub async fn upsert_admin(db: &Db, credentials: &UserCredentials) -> Result<(), DbError> {
    let user = &credentials.user;
    db.execute(
        "INSERT INTO users (id, email, name, password_hash, role, created_at, updated_at)
         VALUES (?, ?, ?, ?, 'admin', ?, ?)
         ON CONFLICT(email) DO UPDATE SET
             role = 'admin',
             password_hash = excluded.password_hash,
             updated_at = excluded.updated_at",
        params![
            &user.id,
            &user.email,
            user.name.clone(),
            &credentials.password_hash,
            user.created_at,
            user.created_at
        ],
    )
    .await?;
    Ok(())
}

pub async fn find_by_email(db: &Db, email: &str) -> Result<Option<UserCredentials>, DbError> {
    let sql = format!("{SELECT_USER} WHERE email = ?");
    db.query_optional::<UserRow>(&sql, params![email])
        .await?
        .map(UserRow::into_credentials)
        .transpose()
}

pub async fn find_by_id(db: &Db, id: &UserId) -> Result<Option<User>, DbError> {
    let sql = format!("{SELECT_USER} WHERE id = ?");
    Ok(db
        .query_optional::<UserRow>(&sql, params![id])
        .await?
        .map(UserRow::into_credentials)
        .transpose()?
        .map(|c| c.user))
}

pub async fn count_customers(db: &Db) -> Result<i64, DbError> {
    db.scalar_i64("SELECT COUNT(*) FROM users WHERE role = 'customer'", &[])
        .await
}
