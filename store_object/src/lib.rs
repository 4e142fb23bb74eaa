//! Store Object - Core database abstraction layer for Commentable
//!
//! This crate provides the table metadata and session traits, the query
//! builder, and two stores implementing them: [`PgStore`] over sqlx and the
//! process-local [`MemStore`].

/// SQL statement logging, compiled in only with the `debug-logging` feature
#[cfg(feature = "debug-logging")]
macro_rules! sql_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
macro_rules! sql_log {
    ($($arg:tt)*) => {};
}

pub mod errors;
pub mod mem_store;
pub mod pg_store;
pub mod prelude;
pub mod query_builder;
pub mod traits;
pub mod value;

#[cfg(test)]
mod test_model;

pub use errors::{StoreError, StoreResult};
pub use mem_store::MemStore;
pub use pg_store::{PgStore, PgTransaction};
pub use query_builder::{QueryBuilder, QueryFilter, QueryOperator, SortOrder, UpdateSet};
pub use traits::{run_in_transaction, Insertable, Session, Store, TableMetadata, UnitOfWork, ROW_COLUMNS};
pub use value::SqlValue;

/// Primary key type of every table (`BIGSERIAL`)
pub type Id = i64;
