//! PostgreSQL store
//!
//! Runs every [`Session`](crate::traits::Session) operation as generated SQL
//! over sqlx, either on a pooled connection or inside a transaction.

pub mod core;
pub mod session;
pub mod transaction;

pub use self::core::PgStore;
pub use session::{PgPooledSession, PgSession, PgTransaction};
