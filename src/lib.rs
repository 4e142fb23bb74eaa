//! # Commentable
//!
//! A policy layer for a polymorphic reply graph stored in PostgreSQL: users
//! write posts, replies attach to a post or to a reply of a post.
//!
//! - replies nest at most two levels deep (`InvalidNesting` otherwise);
//! - deleting a post soft-deletes its direct replies in the same transaction;
//! - a retention sweep hard-deletes replies soft-deleted more than N days ago.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use commentable::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let policy = Commentable::<PgStore>::connect(&config).await?;
//!     policy.migrate().await?;
//!
//!     let user = policy.create_user("User A").await?;
//!     let post = policy.create_post(user.id, "Post Title", "Post Content").await?;
//!     let reply = policy.create_reply("Reply 1", user.id, ParentRef::Post(post.id)).await?;
//!     policy.create_reply("Reply 1.1", user.id, ParentRef::Reply(reply.id)).await?;
//!
//!     let outcome = policy.delete_post(post.id).await?;
//!     println!("{} replies soft-deleted", outcome.replies_soft_deleted);
//!
//!     let removed = policy.sweep_expired().await?;
//!     println!("{} replies purged", removed);
//!     Ok(())
//! }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod core;
pub mod errors;
pub mod migration;
pub mod models;
pub mod parent;
pub mod prelude;

// Re-export the main public types for convenience
pub use crate::core::{CascadeOutcome, Commentable};
pub use errors::CommentableError;
pub use models::{EntityKind, ParentKind, ParentRef, Post, Reply, User};

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig, PolicyConfig, PostDeleteMode};

// Re-export the persistence layer used in the public API
pub use store_object;

// Re-export external dependencies used in public API
pub use sqlx;
pub use async_trait;
