//! Database access, one module per table group.
//!
//! Reads and single-statement writes take a [`Db`](maison_db::Db); writes
//! that must land together take a [`Transaction`](maison_db::Transaction).
//! Every function returns [`DbError`]; rows that don't map back onto a
//! domain type are reported as [`DbError::DeserializeError`].

pub mod addresses;
pub mod cart;
pub mod catalog;
pub mod coupons;
pub mod engagement;
pub mod orders;
pub mod payments;
pub mod sessions;
pub mod users;

use maison_commerce::Currency;
use maison_db::DbError;

/// Report a column value that doesn't parse.
pub(crate) fn corrupt(column: &str, value: &str) -> DbError {
    DbError::DeserializeError(format!("unexpected {column} value: {value:?}"))
}

pub(crate) fn parse_currency(code: &str) -> Result<Currency, DbError> {
    Currency::from_code(code).ok_or_else(|| corrupt("currency", code))
}

/// Decode a JSON text column.
pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(
    column: &str,
    text: &str,
) -> Result<T, DbError> {
    serde_json::from_str(text)
        .map_err(|e| DbError::DeserializeError(format!("bad JSON in {column}: {e}")))
}

pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> Result<String, DbError> {
    Ok(serde_json::to_string(value)?)
}
