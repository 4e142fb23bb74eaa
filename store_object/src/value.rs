//! Typed column values
//!
//! Values bound into generated SQL and compared by the in-memory evaluator.
//! Keeping the type explicit avoids guessing a PostgreSQL type from a JSON
//! string (a reply whose content happens to look like a timestamp is still text).

use chrono::{DateTime, Utc};
use serde_json::Value;

/// A single typed value for a column
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl SqlValue {
    /// JSON representation used for in-memory rows
    pub fn to_json(&self) -> Value {
        match self {
            SqlValue::Null => Value::Null,
            SqlValue::Bool(b) => Value::Bool(*b),
            SqlValue::Int(i) => Value::from(*i),
            SqlValue::Text(s) => Value::String(s.clone()),
            SqlValue::Timestamp(ts) => Value::String(ts.to_rfc3339()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(i64::from(value))
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(value: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

// Shared binding logic for every sqlx query shape the stores build
macro_rules! bind_sql_value {
    ($query:expr, $value:expr) => {
        match $value {
            $crate::value::SqlValue::Null => $query.bind(Option::<String>::None),
            $crate::value::SqlValue::Bool(b) => $query.bind(b),
            $crate::value::SqlValue::Int(i) => $query.bind(i),
            $crate::value::SqlValue::Text(s) => $query.bind(s),
            $crate::value::SqlValue::Timestamp(ts) => $query.bind(ts),
        }
    };
}

pub(crate) use bind_sql_value;
