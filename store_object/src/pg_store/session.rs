//! Session implementation over a single PostgreSQL connection
//!
//! The same implementation serves pooled autocommit connections and open
//! transactions, since both dereference to a `PgConnection`.

use crate::errors::{StoreError, StoreResult};
use crate::query_builder::sql_generation::SqlGenerator;
use crate::query_builder::{QueryBuilder, UpdateSet};
use crate::traits::table_metadata::check_insert_column;
use crate::traits::{Insertable, Session, TableMetadata};
use crate::value::bind_sql_value;
use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::{PgConnection, Postgres};
use std::ops::DerefMut;

/// A session bound to one connection
pub struct PgSession<C> {
    pub(crate) conn: C,
}

/// Autocommit session holding a pooled connection
pub type PgPooledSession = PgSession<PoolConnection<Postgres>>;

/// Open transaction; dropped without commit it rolls back
pub type PgTransaction = PgSession<sqlx::Transaction<'static, Postgres>>;

impl<C> PgSession<C> {
    pub(crate) fn new(conn: C) -> Self {
        Self { conn }
    }
}

/// Join the non-empty parts of a statement with single spaces
fn assemble(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl<C> Session for PgSession<C>
where
    C: DerefMut<Target = PgConnection> + Send,
{
    async fn create<T: TableMetadata>(&mut self, draft: T::Draft) -> StoreResult<T> {
        let values = draft.values();

        let mut columns = Vec::with_capacity(values.len());
        let mut placeholders = Vec::with_capacity(values.len());
        let mut bound = Vec::with_capacity(values.len());
        for (column, value) in values {
            check_insert_column::<T>(column)?;
            columns.push(column);
            if value.is_null() {
                placeholders.push("NULL".to_string());
            } else {
                bound.push(value);
                placeholders.push(format!("${}", bound.len()));
            }
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
            T::table_name(),
            columns.join(", "),
            placeholders.join(", ")
        );
        sql_log!("[CREATE] SQL: {}", sql);

        let mut query = sqlx::query_as::<_, T>(&sql);
        for value in bound {
            query = bind_sql_value!(query, value);
        }

        query
            .fetch_one(&mut *self.conn)
            .await
            .map_err(|e| StoreError::database_operation(T::table_name(), "create", e))
    }

    async fn find<T: TableMetadata>(&mut self, query: QueryBuilder) -> StoreResult<Vec<T>> {
        query.validate::<T>()?;
        let (where_clause, order_clause, limit_clause, params) = query.build::<T>();
        let order_clause = if order_clause.is_empty() {
            format!("ORDER BY {} ASC", T::primary_key_field())
        } else {
            order_clause
        };

        let select = format!("SELECT * FROM {}", T::table_name());
        let sql = assemble(&[&select, &where_clause, &order_clause, &limit_clause].map(String::as_str));
        sql_log!("[FIND] SQL: {}", sql);

        let mut sqlx_query = sqlx::query_as::<_, T>(&sql);
        for param in params {
            sqlx_query = bind_sql_value!(sqlx_query, param);
        }

        sqlx_query
            .fetch_all(&mut *self.conn)
            .await
            .map_err(|e| StoreError::database_operation(T::table_name(), "find", e))
    }

    async fn count_where<T: TableMetadata>(&mut self, query: QueryBuilder) -> StoreResult<i64> {
        query.validate::<T>()?;
        let (where_clause, params) = query.build_where_clause::<T>(1);

        let select = format!("SELECT COUNT(*) FROM {}", T::table_name());
        let sql = assemble(&[select.as_str(), where_clause.as_str()]);

        let mut sqlx_query = sqlx::query_scalar::<_, i64>(&sql);
        for param in params {
            sqlx_query = bind_sql_value!(sqlx_query, param);
        }

        sqlx_query
            .fetch_one(&mut *self.conn)
            .await
            .map_err(|e| StoreError::database_operation(T::table_name(), "count", e))
    }

    async fn update_where<T: TableMetadata>(
        &mut self,
        query: QueryBuilder,
        update: UpdateSet,
    ) -> StoreResult<u64> {
        query.validate::<T>()?;
        update.validate::<T>()?;
        if update.is_empty() {
            return Ok(0);
        }

        // SET parameters are numbered first, WHERE parameters continue after them
        let (set_clause, set_values) = SqlGenerator::build_set_clause(&update, 1);
        let (where_clause, where_values) = query.build_where_clause::<T>(set_values.len() + 1);

        let update_stmt = format!(
            "UPDATE {} SET {}, updated_at = NOW()",
            T::table_name(),
            set_clause
        );
        let sql = assemble(&[update_stmt.as_str(), where_clause.as_str()]);
        sql_log!("[UPDATE_WHERE] SQL: {}", sql);

        let mut sqlx_query = sqlx::query(&sql);
        for param in set_values.into_iter().chain(where_values) {
            sqlx_query = bind_sql_value!(sqlx_query, param);
        }

        let result = sqlx_query
            .execute(&mut *self.conn)
            .await
            .map_err(|e| StoreError::database_operation(T::table_name(), "update_where", e))?;
        Ok(result.rows_affected())
    }

    async fn delete_where<T: TableMetadata>(&mut self, query: QueryBuilder) -> StoreResult<u64> {
        query.validate::<T>()?;
        let (where_clause, params) = query.build_where_clause::<T>(1);

        let delete_stmt = format!("DELETE FROM {}", T::table_name());
        let sql = assemble(&[delete_stmt.as_str(), where_clause.as_str()]);
        sql_log!("[DELETE_WHERE] SQL: {}", sql);

        let mut sqlx_query = sqlx::query(&sql);
        for param in params {
            sqlx_query = bind_sql_value!(sqlx_query, param);
        }

        let result = sqlx_query
            .execute(&mut *self.conn)
            .await
            .map_err(|e| StoreError::database_operation(T::table_name(), "delete_where", e))?;
        Ok(result.rows_affected())
    }
}
