//! Query filters
//!
//! Predicates over table columns. The same filter renders to a SQL `WHERE`
//! clause for PostgreSQL and is evaluated directly by the in-memory store.

use crate::value::SqlValue;

/// Query condition operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOperator {
    Eq,        // =
    Ne,        // !=
    Gt,        // >
    Gte,       // >=
    Lt,        // <
    Lte,       // <=
    In,        // IN
    IsNull,    // IS NULL
    IsNotNull, // IS NOT NULL
}

/// Right-hand side of a condition
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    None,
    Value(SqlValue),
    List(Vec<SqlValue>),
}

/// Single condition in WHERE clause
#[derive(Debug, Clone)]
pub struct QueryCondition {
    pub field: String,
    pub operator: QueryOperator,
    pub operand: Operand,
}

/// Logical operators for combining conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

/// Query filter that can be nested
#[derive(Debug, Clone)]
pub enum QueryFilter {
    Condition(QueryCondition),
    Group {
        operator: LogicalOperator,
        filters: Vec<QueryFilter>,
    },
}

impl QueryFilter {
    /// Create a simple condition
    pub fn condition(field: &str, operator: QueryOperator, operand: Operand) -> Self {
        Self::Condition(QueryCondition {
            field: field.to_string(),
            operator,
            operand,
        })
    }

    /// Create AND group
    pub fn and(filters: Vec<QueryFilter>) -> Self {
        Self::Group {
            operator: LogicalOperator::And,
            filters,
        }
    }

    /// Create OR group
    pub fn or(filters: Vec<QueryFilter>) -> Self {
        Self::Group {
            operator: LogicalOperator::Or,
            filters,
        }
    }

    /// Equal condition; a NULL value means `IS NULL`
    pub fn eq(field: &str, value: impl Into<SqlValue>) -> Self {
        Self::condition(field, QueryOperator::Eq, Operand::Value(value.into()))
    }

    /// Not equal condition; a NULL value means `IS NOT NULL`
    pub fn ne(field: &str, value: impl Into<SqlValue>) -> Self {
        Self::condition(field, QueryOperator::Ne, Operand::Value(value.into()))
    }

    pub fn gt(field: &str, value: impl Into<SqlValue>) -> Self {
        Self::condition(field, QueryOperator::Gt, Operand::Value(value.into()))
    }

    pub fn gte(field: &str, value: impl Into<SqlValue>) -> Self {
        Self::condition(field, QueryOperator::Gte, Operand::Value(value.into()))
    }

    pub fn lt(field: &str, value: impl Into<SqlValue>) -> Self {
        Self::condition(field, QueryOperator::Lt, Operand::Value(value.into()))
    }

    pub fn lte(field: &str, value: impl Into<SqlValue>) -> Self {
        Self::condition(field, QueryOperator::Lte, Operand::Value(value.into()))
    }

    /// IN condition
    pub fn in_values<V: Into<SqlValue>>(field: &str, values: Vec<V>) -> Self {
        Self::condition(
            field,
            QueryOperator::In,
            Operand::List(values.into_iter().map(Into::into).collect()),
        )
    }

    /// IS NULL condition
    pub fn is_null(field: &str) -> Self {
        Self::condition(field, QueryOperator::IsNull, Operand::None)
    }

    /// IS NOT NULL condition
    pub fn is_not_null(field: &str) -> Self {
        Self::condition(field, QueryOperator::IsNotNull, Operand::None)
    }

    /// Every field name referenced by this filter, including nested groups
    pub fn fields(&self) -> Vec<&str> {
        match self {
            QueryFilter::Condition(condition) => vec![condition.field.as_str()],
            QueryFilter::Group { filters, .. } => {
                filters.iter().flat_map(|f| f.fields()).collect()
            }
        }
    }
}
