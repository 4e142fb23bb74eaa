//! Table state for the in-memory store
//!
//! Rows are kept as JSON objects keyed by primary key, so the same filter
//! evaluator serves every table without per-model code.

use crate::errors::{StoreError, StoreResult};
use crate::query_builder::eval::{compare_cells, matches_all};
use crate::query_builder::{QueryBuilder, QueryFilter, UpdateSet};
use crate::traits::table_metadata::check_insert_column;
use crate::traits::{Insertable, TableMetadata};
use crate::value::SqlValue;
use crate::Id;
use chrono::Utc;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Default)]
struct Table {
    rows: BTreeMap<Id, Value>,
    last_id: Id,
}

impl Table {
    fn matching_ids(&self, conditions: &[QueryFilter]) -> Vec<Id> {
        self.rows
            .iter()
            .filter(|(_, row)| matches_all(conditions, row))
            .map(|(id, _)| *id)
            .collect()
    }
}

/// Every table of one in-memory database
#[derive(Debug, Clone, Default)]
pub struct MemState {
    tables: HashMap<&'static str, Table>,
}

fn decode<T: TableMetadata>(row: &Value) -> StoreResult<T> {
    serde_json::from_value(row.clone()).map_err(|e| StoreError::serialization(T::table_name(), e))
}

fn null() -> Value {
    Value::Null
}

impl MemState {
    fn table<T: TableMetadata>(&self) -> Option<&Table> {
        self.tables.get(T::table_name())
    }

    fn table_mut<T: TableMetadata>(&mut self) -> &mut Table {
        self.tables.entry(T::table_name()).or_default()
    }

    pub fn create<T: TableMetadata>(&mut self, draft: T::Draft) -> StoreResult<T> {
        let now = SqlValue::Timestamp(Utc::now()).to_json();

        let mut row = Map::new();
        for (column, value) in draft.values() {
            check_insert_column::<T>(column)?;
            row.insert(column.to_string(), value.to_json());
        }
        row.insert("created_at".to_string(), now.clone());
        row.insert("updated_at".to_string(), now);
        for column in T::columns() {
            row.entry(column.to_string()).or_insert_with(null);
        }

        let table = self.table_mut::<T>();
        let id = table.last_id + 1;
        row.insert(T::primary_key_field().to_string(), Value::from(id));
        let row = Value::Object(row);

        // Decode before storing so a draft the model rejects leaves no row behind
        let model = decode::<T>(&row)?;
        table.last_id = id;
        table.rows.insert(id, row);
        Ok(model)
    }

    pub fn find<T: TableMetadata>(&self, query: &QueryBuilder) -> StoreResult<Vec<T>> {
        query.validate::<T>()?;
        let Some(table) = self.table::<T>() else {
            return Ok(Vec::new());
        };

        let conditions = query.scoped_conditions::<T>();
        let mut rows: Vec<&Value> = table
            .rows
            .values()
            .filter(|row| matches_all(&conditions, row))
            .collect();

        // Stable sort: rows already in primary key order break ties
        if !query.order_by.is_empty() {
            rows.sort_by(|a, b| {
                for (field, order) in &query.order_by {
                    let left = a.get(field).unwrap_or(&Value::Null);
                    let right = b.get(field).unwrap_or(&Value::Null);
                    let ordering = order.apply(compare_cells(left, right));
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(usize::try_from(limit).unwrap_or(0));
        }

        rows.into_iter().map(decode::<T>).collect()
    }

    pub fn count_where<T: TableMetadata>(&self, query: &QueryBuilder) -> StoreResult<i64> {
        query.validate::<T>()?;
        let Some(table) = self.table::<T>() else {
            return Ok(0);
        };
        let conditions = query.scoped_conditions::<T>();
        let count = table.matching_ids(&conditions).len();
        Ok(count as i64)
    }

    pub fn update_where<T: TableMetadata>(
        &mut self,
        query: &QueryBuilder,
        update: &UpdateSet,
    ) -> StoreResult<u64> {
        query.validate::<T>()?;
        update.validate::<T>()?;
        if update.is_empty() {
            return Ok(0);
        }

        let conditions = query.scoped_conditions::<T>();
        let now = SqlValue::Timestamp(Utc::now()).to_json();
        let table = self.table_mut::<T>();
        let ids = table.matching_ids(&conditions);
        for id in &ids {
            if let Some(Value::Object(row)) = table.rows.get_mut(id) {
                for (field, value) in &update.assignments {
                    row.insert(field.clone(), value.to_json());
                }
                row.insert("updated_at".to_string(), now.clone());
            }
        }
        Ok(ids.len() as u64)
    }

    pub fn delete_where<T: TableMetadata>(&mut self, query: &QueryBuilder) -> StoreResult<u64> {
        query.validate::<T>()?;
        let conditions = query.scoped_conditions::<T>();
        let table = self.table_mut::<T>();
        let ids = table.matching_ids(&conditions);
        for id in &ids {
            table.rows.remove(id);
        }
        Ok(ids.len() as u64)
    }
}
