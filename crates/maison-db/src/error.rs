//! Database error types.

use thiserror::Error;

/// Errors that can occur when using the database.
#[derive(Error, Debug)]
pub enum DbError {
    /// Failed to open the database.
    #[error("Failed to open database: {0}")]
    OpenError(String),

    /// Failed to execute a query.
    #[error("Query execution failed: {0}")]
    QueryError(String),

    /// A unique or foreign-key constraint rejected the write.
    #[error("Constraint violation: {0}")]
    Conflict(String),

    /// Failed to deserialize a row.
    #[error("Deserialization error: {0}")]
    DeserializeError(String),

    /// No rows returned when one was expected.
    #[error("No rows returned")]
    NotFound,
}

impl DbError {
    /// Check if this error came from a constraint violation.
    pub fn is_conflict(&self) -> bool {
        matches!(self, DbError::Conflict(_))
    }
}

impl From<serde_json::Error> for DbError {
    fn from(e: serde_json::Error) -> Self {
        DbError::DeserializeError(e.to_string())
    }
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => DbError::NotFound,
            sqlx::Error::Database(db_err)
                if db_err.is_unique_violation() || db_err.is_foreign_key_violation() =>
            {
                DbError::Conflict(db_err.message().to_string())
            }
            _ => DbError::QueryError(e.to_string()),
        }
    }
}
