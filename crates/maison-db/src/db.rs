//! Database connection and query execution.

use std::str::FromStr;
use std::time::Duration;

use serde::de::DeserializeOwned;
use sqlx::query::Query;
use sqlx::sqlite::{
    Sqlite, SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Column, Executor, Row as _, TypeInfo, ValueRef};
use tracing::debug;

use crate::{DbError, QueryResult, Row, Value};

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// SQLite database handle.
///
/// Cheap to clone; all clones share one connection pool. Provides typed
/// query execution with automatic result deserialization.
#[derive(Debug, Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// Open (or create) a SQLite database at the given URL.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let db = Db::connect("sqlite://data/maison.db").await?;
    /// ```
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| DbError::OpenError(e.to_string()))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await
            .map_err(|e| DbError::OpenError(e.to_string()))?;

        debug!(url, "database opened");
        Ok(Self { pool })
    }

    /// Open a private in-memory database.
    ///
    /// The pool holds exactly one connection that never expires, so the
    /// data lives as long as the handle. While a [`Transaction`] is open,
    /// every other call on the same handle waits for it to finish.
    pub async fn in_memory() -> Result<Self, DbError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DbError::OpenError(e.to_string()))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| DbError::OpenError(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Execute a SQL statement that doesn't return rows.
    ///
    /// Returns the number of affected rows.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// db.execute(
    ///     "UPDATE product_variants SET stock = stock + ? WHERE id = ?",
    ///     params![3, "var-1"],
    /// )
    /// .await?;
    /// ```
    pub async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64, DbError> {
        run_execute(&self.pool, sql, params).await
    }

    /// Execute a SQL query and return raw results.
    pub async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult, DbError> {
        run_query(&self.pool, sql, params).await
    }

    /// Execute a SQL query and deserialize results into a vector.
    pub async fn query_as<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<Vec<T>, DbError> {
        self.query(sql, params).await?.deserialize_all()
    }

    /// Execute a SQL query and return a single row.
    ///
    /// Returns [`DbError::NotFound`] if no rows are returned.
    pub async fn query_one<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<T, DbError> {
        let result = self.query(sql, params).await?;
        result.first().ok_or(DbError::NotFound)?.deserialize()
    }

    /// Execute a SQL query and return an optional single row.
    pub async fn query_optional<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<Option<T>, DbError> {
        let result = self.query(sql, params).await?;
        result.first().map(Row::deserialize).transpose()
    }

    /// Run a query whose first column is an integer (COUNT, SUM, ...).
    ///
    /// NULL and empty results read as zero.
    pub async fn scalar_i64(&self, sql: &str, params: &[Value]) -> Result<i64, DbError> {
        let result = self.query(sql, params).await?;
        Ok(first_integer(&result))
    }

    /// Start a transaction.
    pub async fn begin(&self) -> Result<Transaction, DbError> {
        let inner = self.pool.begin().await?;
        Ok(Transaction { inner })
    }

    /// Close the pool, waiting for open connections to be returned.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// An open database transaction.
///
/// Dropping it without calling [`Transaction::commit`] rolls back.
pub struct Transaction {
    inner: sqlx::Transaction<'static, Sqlite>,
}

impl Transaction {
    /// Execute a statement inside the transaction.
    pub async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64, DbError> {
        run_execute(&mut *self.inner, sql, params).await
    }

    /// Execute a query inside the transaction.
    pub async fn query(&mut self, sql: &str, params: &[Value]) -> Result<QueryResult, DbError> {
        run_query(&mut *self.inner, sql, params).await
    }

    /// Execute a query and deserialize all rows.
    pub async fn query_as<T: DeserializeOwned>(
        &mut self,
        sql: &str,
        params: &[Value],
    ) -> Result<Vec<T>, DbError> {
        self.query(sql, params).await?.deserialize_all()
    }

    /// Execute a query and return an optional single row.
    pub async fn query_optional<T: DeserializeOwned>(
        &mut self,
        sql: &str,
        params: &[Value],
    ) -> Result<Option<T>, DbError> {
        let result = self.query(sql, params).await?;
        result.first().map(Row::deserialize).transpose()
    }

    /// Run a query whose first column is an integer.
    pub async fn scalar_i64(&mut self, sql: &str, params: &[Value]) -> Result<i64, DbError> {
        let result = self.query(sql, params).await?;
        Ok(first_integer(&result))
    }

    /// Commit the transaction.
    pub async fn commit(self) -> Result<(), DbError> {
        self.inner.commit().await?;
        Ok(())
    }

    /// Roll the transaction back explicitly.
    pub async fn rollback(self) -> Result<(), DbError> {
        self.inner.rollback().await?;
        Ok(())
    }
}

fn first_integer(result: &QueryResult) -> i64 {
    result
        .first()
        .and_then(Row::first_value)
        .and_then(Value::as_integer)
        .unwrap_or(0)
}

fn bind_params<'q>(sql: &'q str, params: &'q [Value]) -> SqliteQuery<'q> {
    let mut query = sqlx::query(sql);
    for param in params {
        query = match param {
            Value::Null => query.bind(None::<i64>),
            Value::Integer(i) => query.bind(*i),
            Value::Real(f) => query.bind(*f),
            Value::Text(s) => query.bind(s.as_str()),
            Value::Blob(b) => query.bind(b.as_slice()),
        };
    }
    query
}

async fn run_execute<'c, E>(executor: E, sql: &str, params: &[Value]) -> Result<u64, DbError>
where
    E: Executor<'c, Database = Sqlite>,
{
    let result = bind_params(sql, params).execute(executor).await?;
    Ok(result.rows_affected())
}

async fn run_query<'c, E>(executor: E, sql: &str, params: &[Value]) -> Result<QueryResult, DbError>
where
    E: Executor<'c, Database = Sqlite>,
{
    let rows = bind_params(sql, params).fetch_all(executor).await?;

    let columns: Vec<String> = match rows.first() {
        Some(row) => row.columns().iter().map(|c| c.name().to_string()).collect(),
        None => Vec::new(),
    };

    let rows = rows
        .iter()
        .map(|row| convert_row(row, &columns))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(QueryResult::new(columns, rows))
}

/// Convert an sqlx row using the dynamic storage class of each value.
fn convert_row(row: &SqliteRow, columns: &[String]) -> Result<Row, DbError> {
    let mut values = Vec::with_capacity(columns.len());

    for index in 0..columns.len() {
        let storage = {
            let raw = row.try_get_raw(index)?;
            if raw.is_null() {
                None
            } else {
                Some(raw.type_info().name().to_string())
            }
        };

        let value = match storage.as_deref() {
            None => Value::Null,
            Some("INTEGER") | Some("BOOLEAN") => {
                Value::Integer(row.try_get_unchecked::<i64, _>(index)?)
            }
            Some("REAL") | Some("NUMERIC") => Value::Real(row.try_get_unchecked::<f64, _>(index)?),
            Some("BLOB") => Value::Blob(row.try_get_unchecked::<Vec<u8>, _>(index)?),
            Some(_) => Value::Text(row.try_get_unchecked::<String, _>(index)?),
        };
        values.push(value);
    }

    Ok(Row::new(columns.to_vec(), values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Item {
        id: String,
        qty: i64,
        price: f64,
        note: Option<String>,
    }

    async fn setup() -> Db {
        let db = Db::in_memory().await.unwrap();
        db.execute(
            "CREATE TABLE items (id TEXT PRIMARY KEY, qty INTEGER NOT NULL, price REAL NOT NULL, note TEXT)",
            params![],
        )
        .await
        .unwrap();
        db
    }

    #[tokio::test]
    async fn test_insert_and_query_as() {
        let db = setup().await;
        db.execute(
            "INSERT INTO items (id, qty, price, note) VALUES (?, ?, ?, ?)",
            params!["a", 2, 9.5, None::<String>],
        )
        .await
        .unwrap();

        let items: Vec<Item> = db.query_as("SELECT * FROM items", params![]).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "a");
        assert_eq!(items[0].qty, 2);
        assert!((items[0].price - 9.5).abs() < f64::EPSILON);
        assert!(items[0].note.is_none());
    }

    #[tokio::test]
    async fn test_unique_violation_is_conflict() {
        let db = setup().await;
        let insert = "INSERT INTO items (id, qty, price) VALUES (?, ?, ?)";
        db.execute(insert, params!["a", 1, 1.0]).await.unwrap();
        let err = db.execute(insert, params!["a", 1, 1.0]).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_query_one_not_found() {
        let db = setup().await;
        let result = db
            .query_one::<Item>("SELECT * FROM items WHERE id = ?", params!["missing"])
            .await;
        assert!(matches!(result, Err(DbError::NotFound)));
    }

    #[tokio::test]
    async fn test_scalar_on_empty_sum_is_zero() {
        let db = setup().await;
        let total = db.scalar_i64("SELECT SUM(qty) FROM items", params![]).await.unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_transaction_rollback_on_drop() {
        let db = setup().await;
        {
            let mut tx = db.begin().await.unwrap();
            tx.execute("INSERT INTO items (id, qty, price) VALUES ('b', 1, 1.0)", params![])
                .await
                .unwrap();
        }
        let count = db.scalar_i64("SELECT COUNT(*) FROM items", params![]).await.unwrap();
        assert_eq!(count, 0);

        let mut tx = db.begin().await.unwrap();
        tx.execute("INSERT INTO items (id, qty, price) VALUES ('c', 1, 1.0)", params![])
            .await
            .unwrap();
        tx.commit().await.unwrap();
        let count = db.scalar_i64("SELECT COUNT(*) FROM items", params![]).await.unwrap();
        assert_eq!(count, 1);
    }
}
