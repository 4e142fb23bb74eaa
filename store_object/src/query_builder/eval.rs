//! In-memory evaluation of filters against JSON rows
//!
//! Follows SQL semantics: any comparison with NULL (or a missing column) is
//! false, only `IS NULL` / `IS NOT NULL` observe NULLs.

use crate::query_builder::filter::{LogicalOperator, Operand, QueryCondition, QueryFilter, QueryOperator};
use crate::value::SqlValue;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::cmp::Ordering;

/// True when every filter matches the row
pub fn matches_all(filters: &[QueryFilter], row: &Value) -> bool {
    filters.iter().all(|f| matches(f, row))
}

pub fn matches(filter: &QueryFilter, row: &Value) -> bool {
    match filter {
        QueryFilter::Condition(condition) => matches_condition(condition, row),
        QueryFilter::Group { operator, filters } => match operator {
            LogicalOperator::And => filters.iter().all(|f| matches(f, row)),
            LogicalOperator::Or => filters.iter().any(|f| matches(f, row)),
        },
    }
}

fn matches_condition(condition: &QueryCondition, row: &Value) -> bool {
    let cell = row.get(&condition.field).unwrap_or(&Value::Null);

    match (&condition.operator, &condition.operand) {
        (QueryOperator::IsNull, _) | (QueryOperator::Eq, Operand::Value(SqlValue::Null)) => {
            cell.is_null()
        }
        (QueryOperator::IsNotNull, _) | (QueryOperator::Ne, Operand::Value(SqlValue::Null)) => {
            !cell.is_null()
        }
        (QueryOperator::In, Operand::List(list)) => list
            .iter()
            .any(|v| compare_cell(cell, v) == Some(Ordering::Equal)),
        (operator, Operand::Value(value)) => match compare_cell(cell, value) {
            None => false,
            Some(ordering) => match operator {
                QueryOperator::Eq => ordering == Ordering::Equal,
                QueryOperator::Ne => ordering != Ordering::Equal,
                QueryOperator::Gt => ordering == Ordering::Greater,
                QueryOperator::Gte => ordering != Ordering::Less,
                QueryOperator::Lt => ordering == Ordering::Less,
                QueryOperator::Lte => ordering != Ordering::Greater,
                _ => false,
            },
        },
        _ => false,
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Compare a stored cell with a typed value; `None` when either side is NULL
/// or the types do not line up.
pub fn compare_cell(cell: &Value, value: &SqlValue) -> Option<Ordering> {
    match value {
        SqlValue::Null => None,
        SqlValue::Bool(b) => cell.as_bool().map(|c| c.cmp(b)),
        SqlValue::Int(i) => cell.as_i64().map(|c| c.cmp(i)),
        SqlValue::Text(s) => cell.as_str().map(|c| c.cmp(s.as_str())),
        SqlValue::Timestamp(ts) => cell.as_str().and_then(parse_timestamp).map(|c| c.cmp(ts)),
    }
}

/// Total order over cells for sorting; NULLs sort after every value
/// (PostgreSQL's default for ascending order).
pub fn compare_cells(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
        },
        (Value::String(x), Value::String(y)) => match (parse_timestamp(x), parse_timestamp(y)) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x.cmp(y),
        },
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}
