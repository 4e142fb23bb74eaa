//! Parent resolution for polymorphic replies
//!
//! Maps a `(parent_type, parent_id)` reference to the live row it names.
//! Adding a commentable kind means adding a `ParentKind` variant; the match
//! below then fails to compile until the new kind is resolvable.

use crate::errors::{CommentableError, Result};
use crate::models::{Entity, ParentRef, Post, Reply};
use store_object::{Id, Session};

/// A resolved, live parent row
#[derive(Debug, Clone)]
pub enum Parent {
    Post(Post),
    Reply(Reply),
}

async fn load_live<T: Entity, S: Session>(session: &mut S, parent: ParentRef, id: Id) -> Result<T> {
    match session.get_by_id::<T>(id, false).await {
        Ok(row) => Ok(row),
        Err(e) if e.is_not_found() => Err(CommentableError::ParentNotFound {
            kind: parent.kind(),
            id,
        }),
        Err(e) => Err(CommentableError::persistence("resolve_parent", T::KIND, Some(id), e)),
    }
}

/// Look up the live parent a reference points at; soft-deleted parents count as missing
pub async fn resolve_parent<S: Session>(session: &mut S, parent: ParentRef) -> Result<Parent> {
    match parent {
        ParentRef::Post(id) => Ok(Parent::Post(load_live::<Post, S>(session, parent, id).await?)),
        ParentRef::Reply(id) => Ok(Parent::Reply(load_live::<Reply, S>(session, parent, id).await?)),
    }
}

/// Reject a parent that would place the new reply more than two levels deep
pub fn check_nesting(parent: &Parent) -> Result<()> {
    match parent {
        Parent::Post(_) => Ok(()),
        Parent::Reply(reply) => match reply.parent() {
            ParentRef::Post(_) => Ok(()),
            ParentRef::Reply(_) => Err(CommentableError::InvalidNesting {
                parent_id: reply.id,
            }),
        },
    }
}
