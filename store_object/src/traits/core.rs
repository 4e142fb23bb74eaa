//! Session trait
//!
//! The operations every store exposes, whether running in autocommit mode or
//! inside a transaction. Methods take `&mut self` so a transaction handle can
//! be threaded through a sequence of calls.

use crate::errors::{StoreError, StoreResult};
use crate::query_builder::{QueryBuilder, UpdateSet};
use crate::traits::TableMetadata;
use crate::Id;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait Session: Send {
    /// Insert a row and return it as stored
    async fn create<T: TableMetadata>(&mut self, draft: T::Draft) -> StoreResult<T>;

    /// Rows matching the query, in the query's order (primary key order otherwise)
    async fn find<T: TableMetadata>(&mut self, query: QueryBuilder) -> StoreResult<Vec<T>>;

    /// Count rows matching the query
    async fn count_where<T: TableMetadata>(&mut self, query: QueryBuilder) -> StoreResult<i64>;

    /// Apply the update set to every matching row, returning the number of rows changed.
    /// `updated_at` is refreshed on every changed row.
    async fn update_where<T: TableMetadata>(
        &mut self,
        query: QueryBuilder,
        update: UpdateSet,
    ) -> StoreResult<u64>;

    /// Physically remove matching rows, returning the number removed.
    /// Soft-deleted rows are only candidates when the query includes them.
    async fn delete_where<T: TableMetadata>(&mut self, query: QueryBuilder) -> StoreResult<u64>;

    /// Fetch one row by primary key; soft-deleted rows only when `include_deleted`
    async fn get_by_id<T: TableMetadata>(&mut self, id: Id, include_deleted: bool) -> StoreResult<T> {
        let query = QueryBuilder::by_id(id).include_deleted(include_deleted).limit(1);
        self.find::<T>(query)
            .await?
            .pop()
            .ok_or(StoreError::NotFound {
                table: T::table_name(),
                id,
            })
    }

    /// Mark one row deleted at `at`. A row that is already soft-deleted keeps
    /// its original timestamp; a missing row is `NotFound`.
    async fn soft_delete<T: TableMetadata>(&mut self, id: Id, at: DateTime<Utc>) -> StoreResult<()> {
        let field = T::soft_delete_field().ok_or(StoreError::SoftDeleteUnsupported {
            table: T::table_name(),
        })?;
        let marked = self
            .update_where::<T>(QueryBuilder::by_id(id), UpdateSet::new().set(field, at))
            .await?;
        if marked == 0 {
            // Distinguish "already deleted" from "never existed"
            self.get_by_id::<T>(id, true).await?;
        }
        Ok(())
    }

    /// Mark every matching live row deleted at `at`, returning the number marked
    async fn soft_delete_where<T: TableMetadata>(
        &mut self,
        query: QueryBuilder,
        at: DateTime<Utc>,
    ) -> StoreResult<u64> {
        let field = T::soft_delete_field().ok_or(StoreError::SoftDeleteUnsupported {
            table: T::table_name(),
        })?;
        self.update_where::<T>(query.include_deleted(false), UpdateSet::new().set(field, at))
            .await
    }
}
