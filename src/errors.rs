//! Error types for the commentable policy
//!
//! Invariant and argument errors are raised before anything is written.
//! Store failures are wrapped with the operation and entity they affected.

use crate::models::{EntityKind, ParentKind};
use store_object::{Id, StoreError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommentableError {
    /// The requested parent is itself a reply to a reply
    #[error("Reply {parent_id} is already nested under a reply and cannot take replies")]
    InvalidNesting { parent_id: Id },

    #[error("Parent {kind} {id} not found")]
    ParentNotFound { kind: ParentKind, id: Id },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: Id },

    #[error("Persistence error during {operation}{}: {source}", fmt_target(.kind, .id))]
    Persistence {
        operation: &'static str,
        kind: Option<EntityKind>,
        id: Option<Id>,
        #[source]
        source: StoreError,
    },
}

fn fmt_target(kind: &Option<EntityKind>, id: &Option<Id>) -> String {
    match (kind, id) {
        (Some(kind), Some(id)) => format!(" on {} {}", kind, id),
        (Some(kind), None) => format!(" on {}", kind),
        _ => String::new(),
    }
}

impl CommentableError {
    /// Wrap a store failure. A store-level `NotFound` for the same entity
    /// surfaces as [`CommentableError::NotFound`].
    pub fn persistence(
        operation: &'static str,
        kind: EntityKind,
        id: Option<Id>,
        source: StoreError,
    ) -> Self {
        if let StoreError::NotFound { id, .. } = source {
            return CommentableError::NotFound { kind, id };
        }
        CommentableError::Persistence {
            operation,
            kind: Some(kind),
            id,
            source,
        }
    }
}

/// Attach operation context to store results
pub(crate) trait StoreContext<T> {
    fn context(self, operation: &'static str, kind: EntityKind, id: Option<Id>) -> Result<T>;
}

impl<T> StoreContext<T> for Result<T, StoreError> {
    fn context(self, operation: &'static str, kind: EntityKind, id: Option<Id>) -> Result<T> {
        self.map_err(|e| CommentableError::persistence(operation, kind, id, e))
    }
}

/// Failures of the transaction itself (begin, commit)
impl From<StoreError> for CommentableError {
    fn from(source: StoreError) -> Self {
        CommentableError::Persistence {
            operation: "transaction",
            kind: None,
            id: None,
            source,
        }
    }
}

pub type Result<T, E = CommentableError> = std::result::Result<T, E>;
