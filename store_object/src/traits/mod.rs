//! Traits for database operations
//!
//! This module contains all the traits that define the interface for database operations
//! in the store-object crate.

pub mod core;
pub mod table_metadata;
pub mod transaction;

// Re-export all public items for convenience
pub use self::core::Session;
pub use table_metadata::{Insertable, TableMetadata, ROW_COLUMNS};
pub use transaction::{run_in_transaction, Store, UnitOfWork};
