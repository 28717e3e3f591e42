//! Bind parameters and result rows.
//!
//! Rows are decoded by turning them into a JSON object keyed by column
//! name, so any `Deserialize` struct whose fields match the selected
//! columns can be read straight out of a query.

use crate::DbError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value as Json};

/// A SQLite storage-class value, used for parameters and results.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Integer view; reals are truncated.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Real(f) => Some(*f as i64),
            _ => None,
        }
    }

    fn to_json(&self) -> Json {
        match self {
            Value::Null => Json::Null,
            Value::Integer(i) => Json::from(*i),
            Value::Real(f) => Number::from_f64(*f).map(Json::Number).unwrap_or(Json::Null),
            Value::Text(s) => Json::String(s.clone()),
            // Non UTF-8 blobs surface as base64 text.
            Value::Blob(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => Json::String(text.to_string()),
                Err(_) => {
                    use base64::{engine::general_purpose::STANDARD, Engine};
                    Json::String(STANDARD.encode(bytes))
                }
            },
        }
    }
}

macro_rules! integer_value {
    ($($ty:ty),+) => {
        $(impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::Integer(i64::from(v))
            }
        })+
    };
}

integer_value!(i32, u32, i64);

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// One result row: column names paired with values.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Value of the named column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.values.get(index)
    }

    /// Value of the first selected column.
    pub fn first_value(&self) -> Option<&Value> {
        self.values.first()
    }

    /// Decode the row into `T` by column name.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, DbError> {
        let object: Map<String, Json> = self
            .columns
            .iter()
            .cloned()
            .zip(self.values.iter().map(Value::to_json))
            .collect();
        serde_json::from_value(Json::Object(object))
            .map_err(|e| DbError::DeserializeError(e.to_string()))
    }
}

/// Every row a query returned.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    pub fn deserialize_all<T: DeserializeOwned>(&self) -> Result<Vec<T>, DbError> {
        self.rows.iter().map(Row::deserialize).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct StockRow {
        sku: String,
        stock: i64,
        color: Option<String>,
    }

    #[test]
    fn test_row_decodes_by_column_name() {
        let row = Row::new(
            vec!["stock".into(), "sku".into(), "color".into()],
            vec![Value::from(7), Value::from("TEE-M"), Value::Null],
        );
        let decoded: StockRow = row.deserialize().unwrap();
        assert_eq!(
            decoded,
            StockRow {
                sku: "TEE-M".into(),
                stock: 7,
                color: None
            }
        );
        assert_eq!(row.first_value().and_then(Value::as_integer), Some(7));
        assert!(row.get("size").is_none());
    }

    #[test]
    fn test_option_and_bool_parameters() {
        assert_eq!(Value::from(None::<String>), Value::Null);
        assert_eq!(Value::from(Some("M")), Value::Text("M".into()));
        assert_eq!(Value::from(true), Value::Integer(1));
    }

    #[test]
    fn test_binary_blob_reads_as_base64() {
        let row = Row::new(vec!["b".into()], vec![Value::Blob(vec![0xff, 0xfe])]);
        let json: serde_json::Value = row.deserialize().unwrap();
        assert_eq!(json["b"], "//4=");
    }
}
