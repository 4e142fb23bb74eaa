//! Convenience re-exports for common store-object usage

// Core traits
pub use crate::traits::{run_in_transaction, Insertable, Session, Store, TableMetadata, UnitOfWork};

// Error types
pub use crate::errors::{StoreError, StoreResult};

// Stores
pub use crate::mem_store::MemStore;
pub use crate::pg_store::PgStore;

// Query building
pub use crate::query_builder::{QueryBuilder, QueryFilter, SortOrder, UpdateSet};
pub use crate::value::SqlValue;
pub use crate::Id;

// Common external dependencies that are frequently used
pub use async_trait::async_trait;
pub use serde::{Deserialize, Serialize};
pub use sqlx::{FromRow, PgPool, Row};
