//! Query builder utilities
//!
//! This module provides filter construction, SQL generation and in-memory
//! evaluation of the same filters.

pub mod builder;
pub mod eval;
pub mod filter;
pub mod ordering;
pub mod sql_generation;
pub mod update;


pub use builder::QueryBuilder;
pub use filter::{Operand, QueryFilter, QueryOperator};
pub use ordering::SortOrder;
pub use update::UpdateSet;
