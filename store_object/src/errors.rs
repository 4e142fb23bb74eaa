use crate::Id;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database connection error: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("Duplicate record in {table}")]
    Duplicate { table: &'static str },

    #[error("Not found: {table} id {id}")]
    NotFound { table: &'static str, id: Id },

    #[error("Unknown field '{field}' on {table}")]
    UnknownField { table: &'static str, field: String },

    #[error("{table} does not support soft deletion")]
    SoftDeleteUnsupported { table: &'static str },

    #[error("Database error during {operation} on {table}: {source}")]
    Database {
        table: &'static str,
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Serialization error on {table}: {source}")]
    Serialization {
        table: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Wrap a driver error with the table and operation that produced it.
    /// Unique violations surface as [`StoreError::Duplicate`].
    pub fn database_operation(table: &'static str, operation: &'static str, source: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &source {
            if db.is_unique_violation() {
                return StoreError::Duplicate { table };
            }
        }
        StoreError::Database {
            table,
            operation,
            source,
        }
    }

    pub fn serialization(table: &'static str, source: serde_json::Error) -> Self {
        StoreError::Serialization { table, source }
    }

    pub fn unknown_field(table: &'static str, field: impl Into<String>) -> Self {
        StoreError::UnknownField {
            table,
            field: field.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
