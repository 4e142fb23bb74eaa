use crate::errors::{StoreError, StoreResult};
use crate::traits::{TableMetadata, ROW_COLUMNS};
use crate::value::SqlValue;

/// Column assignments for a conditional update, applied in insertion order.
/// `updated_at` is refreshed by the store and never needs to be listed.
#[derive(Debug, Clone, Default)]
pub struct UpdateSet {
    pub assignments: Vec<(String, SqlValue)>,
}

impl UpdateSet {
    pub fn new() -> Self {
        Self {
            assignments: Vec::new(),
        }
    }

    /// Set a field to a specific value, replacing an earlier assignment to the same field
    pub fn set(mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        let field = field.into();
        let value = value.into();
        match self.assignments.iter_mut().find(|(f, _)| *f == field) {
            Some(slot) => slot.1 = value,
            None => self.assignments.push((field, value)),
        }
        self
    }

    /// Check if there are any operations
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Get number of operations
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.assignments.iter().map(|(f, _)| f.as_str())
    }

    /// Reject unknown fields and the store-maintained row columns
    pub fn validate<T: TableMetadata>(&self) -> StoreResult<()> {
        for field in self.fields() {
            if !T::has_column(field) || ROW_COLUMNS.contains(&field) {
                return Err(StoreError::unknown_field(T::table_name(), field));
            }
        }
        Ok(())
    }
}
