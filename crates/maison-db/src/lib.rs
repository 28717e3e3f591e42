//! Type-safe SQLite database layer for the Maison storefront.
//!
//! Wraps an sqlx SQLite pool behind a small, ergonomic API with
//! JSON-based row deserialization.
//!
//! # Example
//!
//! ```rust,ignore
//! use maison_db::{Db, params};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct CategoryRow {
//!     id: String,
//!     name: String,
//! }
//!
//! let db = Db::connect("sqlite://maison.db").await?;
//! maison_db::schema::migrate(&db).await?;
//!
//! db.execute(
//!     "INSERT INTO categories (id, name, slug, position, created_at, updated_at) VALUES (?, ?, ?, 0, 0, 0)",
//!     params!["cat-1", "Dresses", "dresses"],
//! )
//! .await?;
//!
//! let rows: Vec<CategoryRow> = db
//!     .query_as("SELECT id, name FROM categories WHERE slug = ?", params!["dresses"])
//!     .await?;
//! ```

mod db;
mod error;
pub mod schema;
mod types;

pub use db::{Db, Transaction};
pub use error::DbError;
pub use types::{QueryResult, Row, Value};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{params, Db, DbError, QueryResult, Row, Transaction, Value};
}

/// Create a parameter list for SQL queries.
///
/// # Example
///
/// ```rust,ignore
/// use maison_db::params;
///
/// let params = params!["value1", 42, 3.14];
/// ```
#[macro_export]
macro_rules! params {
    () => {
        &[]
    };
    ($($param:expr),+ $(,)?) => {
        &[$($crate::Value::from($param)),+]
    };
}
