//! Table metadata
//!
//! Describes how a model maps onto a PostgreSQL table. Every table managed by
//! the stores carries the standard row columns `id`, `created_at`,
//! `updated_at` and, for soft-deletable tables, `deleted_at`.

use crate::errors::{StoreError, StoreResult};
use crate::value::SqlValue;
use crate::Id;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Columns maintained by the store rather than supplied on insert
pub const ROW_COLUMNS: [&str; 3] = ["id", "created_at", "updated_at"];

/// Metadata about database table structure
///
/// ```ignore
/// impl TableMetadata for Post {
///     type Draft = NewPost;
///
///     fn table_name() -> &'static str { "posts" }
///     fn columns() -> &'static [&'static str] {
///         &["id", "title", "content", "user_id", "created_at", "updated_at", "deleted_at"]
///     }
///     fn soft_delete_field() -> Option<&'static str> { Some("deleted_at") }
///     fn extract_id(&self) -> Id { self.id }
///     fn create_table_sql() -> String { /* ... */ }
/// }
/// ```
pub trait TableMetadata:
    Clone
    + Send
    + Sync
    + Debug
    + Serialize
    + DeserializeOwned
    + Unpin
    + for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow>
    + 'static
{
    /// Values supplied when creating a row
    type Draft: Insertable;

    /// The table name in the database
    fn table_name() -> &'static str;

    /// Every column of the table, including the row columns
    fn columns() -> &'static [&'static str];

    /// Get the name of the soft delete timestamp column if the table has one
    fn soft_delete_field() -> Option<&'static str> {
        None
    }

    /// Get the primary key field name
    fn primary_key_field() -> &'static str {
        "id"
    }

    /// Extract ID from model instance
    fn extract_id(&self) -> Id;

    /// Generate CREATE TABLE SQL statement
    fn create_table_sql() -> String;

    /// Generate DROP TABLE SQL statement
    fn drop_table_sql() -> String {
        format!("DROP TABLE IF EXISTS {} CASCADE", Self::table_name())
    }

    /// Generate CREATE INDEX SQL statements
    fn create_indexes_sql() -> Vec<String> {
        vec![]
    }

    fn has_column(field: &str) -> bool {
        Self::columns().contains(&field)
    }
}

/// Insert payload for a table: one typed value per supplied column
pub trait Insertable: Clone + Send + Sync + Debug {
    fn values(&self) -> Vec<(&'static str, SqlValue)>;
}

/// Drafts may only name declared columns the store does not maintain itself
pub fn check_insert_column<T: TableMetadata>(column: &str) -> StoreResult<()> {
    if !T::has_column(column) || ROW_COLUMNS.contains(&column) {
        return Err(StoreError::unknown_field(T::table_name(), column));
    }
    Ok(())
}
