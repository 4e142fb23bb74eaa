//! Query builder
//!
//! Collects filters, ordering, a limit and the deletion visibility flag for a
//! single table query.

use crate::errors::{StoreError, StoreResult};
use crate::query_builder::filter::QueryFilter;
use crate::query_builder::ordering::SortOrder;
use crate::query_builder::sql_generation::SqlGenerator;
use crate::traits::TableMetadata;
use crate::value::SqlValue;
use crate::Id;

/// Query builder for constructing table queries
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    pub(crate) conditions: Vec<QueryFilter>,
    pub(crate) order_by: Vec<(String, SortOrder)>,
    pub(crate) limit: Option<i64>,
    pub(crate) include_deleted: bool,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match a single row by primary key
    pub fn by_id(id: Id) -> Self {
        Self::new().filter(QueryFilter::eq("id", id))
    }

    /// Add a filter condition
    pub fn filter(mut self, filter: QueryFilter) -> Self {
        self.conditions.push(filter);
        self
    }

    /// Add multiple filters (combined with AND)
    pub fn filters(mut self, filters: Vec<QueryFilter>) -> Self {
        self.conditions.extend(filters);
        self
    }

    /// Add ordering
    pub fn order_by(mut self, field: &str, order: SortOrder) -> Self {
        self.order_by.push((field.to_string(), order));
        self
    }

    /// Add limit
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Also match soft-deleted rows
    pub fn include_deleted(mut self, include: bool) -> Self {
        self.include_deleted = include;
        self
    }

    /// Reject field names the table does not declare, before any SQL is built
    pub fn validate<T: TableMetadata>(&self) -> StoreResult<()> {
        let filter_fields = self.conditions.iter().flat_map(|c| c.fields());
        let order_fields = self.order_by.iter().map(|(f, _)| f.as_str());
        for field in filter_fields.chain(order_fields) {
            if !T::has_column(field) {
                return Err(StoreError::unknown_field(T::table_name(), field));
            }
        }
        Ok(())
    }

    /// Conditions including the soft delete scope for `T`
    pub fn scoped_conditions<T: TableMetadata>(&self) -> Vec<QueryFilter> {
        let mut conditions = self.conditions.clone();
        if !self.include_deleted {
            if let Some(field) = T::soft_delete_field() {
                conditions.push(QueryFilter::is_null(field));
            }
        }
        conditions
    }

    /// Build WHERE clause with placeholders numbered from `first_param`
    pub fn build_where_clause<T: TableMetadata>(&self, first_param: usize) -> (String, Vec<SqlValue>) {
        SqlGenerator::build_where_clause(&self.scoped_conditions::<T>(), first_param)
    }

    /// Build ORDER BY clause
    pub fn build_order_clause(&self) -> String {
        SqlGenerator::build_order_clause(&self.order_by)
    }

    /// Build LIMIT clause
    pub fn build_limit_clause(&self) -> String {
        SqlGenerator::build_limit_clause(self.limit)
    }

    /// Build complete query parts (WHERE, ORDER BY, LIMIT, Values)
    pub fn build<T: TableMetadata>(&self) -> (String, String, String, Vec<SqlValue>) {
        let (where_clause, values) = self.build_where_clause::<T>(1);
        let order_clause = self.build_order_clause();
        let limit_clause = self.build_limit_clause();

        (where_clause, order_clause, limit_clause, values)
    }
}
