//! Convenience re-exports for common Commentable usage
//!
//! ```rust
//! use commentable::prelude::*;
//! ```

// Policy components
pub use crate::core::{CascadeOutcome, Commentable};
pub use crate::errors::CommentableError;
pub use crate::models::{EntityKind, NewPost, NewReply, NewUser, ParentKind, ParentRef, Post, Reply, User};
pub use crate::parent::{resolve_parent, Parent};

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig, PolicyConfig, PostDeleteMode};

// Re-export commonly used store-object types for convenience
pub use store_object::prelude::*;

// Common external dependencies
pub use anyhow;
pub use async_trait;
pub use sqlx;
pub use tokio;
