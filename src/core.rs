//! Core commentable policy
//!
//! [`Commentable`] wraps a store and applies the reply graph rules on top of
//! it: the nesting limit on reply creation, the cascade from a post to its
//! direct replies, and the retention sweep over soft-deleted replies.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use config::{AppConfig, PolicyConfig, PostDeleteMode};
use store_object::{
    run_in_transaction, Id, MemStore, PgStore, QueryBuilder, QueryFilter, Session, SortOrder,
    Store,
};

use crate::errors::{CommentableError, Result, StoreContext};
use crate::models::{Entity, EntityKind, NewPost, NewReply, NewUser, ParentRef, Post, Reply, User};
use crate::parent::{check_nesting, resolve_parent};

/// Result of deleting a post
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeOutcome {
    pub post_id: Id,
    pub mode: PostDeleteMode,
    /// Live direct replies marked deleted along with the post
    pub replies_soft_deleted: u64,
}

/// Earliest instant a `TIMESTAMPTZ` column can hold (4713 BC)
fn earliest_storable() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(-4712, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Deletion time a reply must predate to expire after `days` days.
/// `None` when the cutoff falls before any storable timestamp, so nothing
/// can be older.
fn retention_cutoff(now: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    TimeDelta::try_days(days)
        .and_then(|age| now.checked_sub_signed(age))
        .filter(|cutoff| *cutoff >= earliest_storable())
}

/// Policy coordinator over a store
#[derive(Debug, Clone)]
pub struct Commentable<S> {
    store: S,
    policy: PolicyConfig,
}

/// Direct children of a parent, soft-deleted ones excluded by default
fn children_of(parent: ParentRef) -> QueryBuilder {
    QueryBuilder::new()
        .filter(QueryFilter::eq("parent_type", parent.kind().as_str()))
        .filter(QueryFilter::eq("parent_id", parent.id()))
}

async fn ensure_live<T: Entity, X: Session>(session: &mut X, id: Id) -> Result<T> {
    session
        .get_by_id::<T>(id, false)
        .await
        .context("lookup", T::KIND, Some(id))
}

async fn insert_post<X: Session>(tx: &mut X, draft: NewPost) -> Result<Post> {
    ensure_live::<User, X>(tx, draft.user_id).await?;
    tx.create::<Post>(draft)
        .await
        .context("create_post", EntityKind::Post, None)
}

async fn insert_reply<X: Session>(tx: &mut X, draft: NewReply) -> Result<Reply> {
    let parent = resolve_parent(tx, draft.parent()).await?;
    check_nesting(&parent)?;
    ensure_live::<User, X>(tx, draft.user_id).await?;
    tx.create::<Reply>(draft)
        .await
        .context("create_reply", EntityKind::Reply, None)
}

async fn cascade_delete_post<X: Session>(
    tx: &mut X,
    post_id: Id,
    mode: PostDeleteMode,
    at: DateTime<Utc>,
) -> Result<CascadeOutcome> {
    ensure_live::<Post, X>(tx, post_id).await?;

    let replies_soft_deleted = tx
        .soft_delete_where::<Reply>(children_of(ParentRef::Post(post_id)), at)
        .await
        .context("delete_post", EntityKind::Reply, None)?;

    match mode {
        PostDeleteMode::Soft => tx
            .soft_delete::<Post>(post_id, at)
            .await
            .context("delete_post", EntityKind::Post, Some(post_id))?,
        PostDeleteMode::Hard => {
            tx.delete_where::<Post>(QueryBuilder::by_id(post_id))
                .await
                .context("delete_post", EntityKind::Post, Some(post_id))?;
        }
    }

    Ok(CascadeOutcome {
        post_id,
        mode,
        replies_soft_deleted,
    })
}

impl<S: Store> Commentable<S> {
    pub fn new(store: S, policy: PolicyConfig) -> Self {
        Self { store, policy }
    }

    /// Get the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    async fn session(&self, operation: &'static str, kind: EntityKind) -> Result<S::Session> {
        self.store.session().await.context(operation, kind, None)
    }

    pub async fn create_user(&self, name: &str) -> Result<User> {
        let mut session = self.session("create_user", EntityKind::User).await?;
        let user = session
            .create::<User>(NewUser {
                name: name.to_string(),
            })
            .await
            .context("create_user", EntityKind::User, None)?;
        debug_log!("[CREATE_USER] user {} '{}'", user.id, user.name);
        Ok(user)
    }

    /// Create a post owned by a live user
    pub async fn create_post(&self, user_id: Id, title: &str, content: &str) -> Result<Post> {
        let draft = NewPost {
            title: title.to_string(),
            content: content.to_string(),
            user_id,
        };
        let post = run_in_transaction(&self.store, move |tx| Box::pin(insert_post(tx, draft))).await?;
        debug_log!("[CREATE_POST] post {} by user {}", post.id, user_id);
        Ok(post)
    }

    /// Create a reply under a post, or under a reply whose own parent is a post.
    ///
    /// The parent is looked up in the same transaction as the insert.
    /// Fails with `ParentNotFound` when the parent is missing or soft-deleted
    /// and with `InvalidNesting` when the parent reply is itself nested.
    pub async fn create_reply(&self, content: &str, user_id: Id, parent: ParentRef) -> Result<Reply> {
        let draft = NewReply::new(content, user_id, parent);
        let reply =
            run_in_transaction(&self.store, move |tx| Box::pin(insert_reply(tx, draft))).await?;
        debug_log!("[CREATE_REPLY] reply {} under {}", reply.id, parent);
        Ok(reply)
    }

    /// Delete a post and soft-delete its live direct replies in one transaction.
    ///
    /// Replies of those replies are left untouched. The post row is
    /// soft- or hard-deleted per [`PolicyConfig::post_delete_mode`].
    pub async fn delete_post(&self, post_id: Id) -> Result<CascadeOutcome> {
        let mode = self.policy.post_delete_mode;
        let at = Utc::now();

        let outcome = run_in_transaction(&self.store, move |tx| {
            Box::pin(cascade_delete_post(tx, post_id, mode, at))
        })
        .await?;

        tracing::info!(
            "[DELETE_POST] post {} deleted ({:?}), {} replies soft-deleted",
            post_id,
            mode,
            outcome.replies_soft_deleted
        );
        Ok(outcome)
    }

    /// Soft-delete every live direct reply of `parent`, returning how many were marked
    pub async fn soft_delete_replies(&self, parent: ParentRef) -> Result<u64> {
        let mut session = self.session("soft_delete_replies", EntityKind::Reply).await?;
        let marked = session
            .soft_delete_where::<Reply>(children_of(parent), Utc::now())
            .await
            .context("soft_delete_replies", EntityKind::Reply, None)?;
        debug_log!("[SOFT_DELETE_REPLIES] {} replies under {}", marked, parent);
        Ok(marked)
    }

    /// Hard-delete replies soft-deleted more than `days` days ago.
    ///
    /// `days == 0` removes every soft-deleted reply. Live replies are never
    /// touched, so repeating a sweep removes nothing new.
    pub async fn hard_delete_older_than(&self, days: i64) -> Result<u64> {
        if days < 0 {
            return Err(CommentableError::InvalidArgument(format!(
                "retention days cannot be negative (got {})",
                days
            )));
        }

        let mut query = QueryBuilder::new()
            .include_deleted(true)
            .filter(QueryFilter::is_not_null("deleted_at"));
        if days > 0 {
            match retention_cutoff(Utc::now(), days) {
                Some(cutoff) => query = query.filter(QueryFilter::lt("deleted_at", cutoff)),
                None => return Ok(0),
            }
        }

        let mut session = self.session("hard_delete_older_than", EntityKind::Reply).await?;
        let removed = session
            .delete_where::<Reply>(query)
            .await
            .context("hard_delete_older_than", EntityKind::Reply, None)?;

        tracing::info!(
            "[RETENTION] removed {} replies soft-deleted more than {} days ago",
            removed,
            days
        );
        Ok(removed)
    }

    /// Run the retention sweep with the configured retention window
    pub async fn sweep_expired(&self) -> Result<u64> {
        self.hard_delete_older_than(self.policy.retention_days).await
    }

    /// Direct replies of `parent` in creation order
    pub async fn find_replies(&self, parent: ParentRef, include_deleted: bool) -> Result<Vec<Reply>> {
        let query = children_of(parent)
            .include_deleted(include_deleted)
            .order_by("created_at", SortOrder::Asc)
            .order_by("id", SortOrder::Asc);

        let mut session = self.session("find_replies", EntityKind::Reply).await?;
        session
            .find::<Reply>(query)
            .await
            .context("find_replies", EntityKind::Reply, None)
    }

    pub async fn count_replies(&self, parent: ParentRef, include_deleted: bool) -> Result<i64> {
        let mut session = self.session("count_replies", EntityKind::Reply).await?;
        session
            .count_where::<Reply>(children_of(parent).include_deleted(include_deleted))
            .await
            .context("count_replies", EntityKind::Reply, None)
    }

    /// Fetch one entity by id; soft-deleted rows only when `include_deleted`
    pub async fn get<T: Entity>(&self, id: Id, include_deleted: bool) -> Result<T> {
        let mut session = self.session("get", T::KIND).await?;
        session
            .get_by_id::<T>(id, include_deleted)
            .await
            .context("get", T::KIND, Some(id))
    }
}

impl Commentable<PgStore> {
    /// Connect to PostgreSQL with the given configuration
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| CommentableError::InvalidArgument(e.to_string()))?;
        let store = PgStore::connect(&config.database)
            .await
            .map_err(|source| CommentableError::Persistence {
                operation: "connect",
                kind: None,
                id: None,
                source,
            })?;
        Ok(Self::new(store, config.policy.clone()))
    }
}

impl Commentable<MemStore> {
    /// Policy over a fresh in-memory store
    pub fn in_memory(policy: PolicyConfig) -> Self {
        Self::new(MemStore::new(), policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retention_cutoff_subtracts_days() {
        let now = Utc::now();
        assert_eq!(retention_cutoff(now, 60), Some(now - TimeDelta::days(60)));
        // About 5,400 years back is still storable
        assert!(retention_cutoff(now, 2_000_000).is_some());
    }

    #[test]
    fn test_retention_cutoff_before_storable_range() {
        let now = Utc::now();
        // Representable in chrono but earlier than 4713 BC
        assert!(now.checked_sub_signed(TimeDelta::days(3_000_000)).is_some());
        assert_eq!(retention_cutoff(now, 3_000_000), None);
        // Not representable at all
        assert_eq!(retention_cutoff(now, 365_000_000), None);
    }

    #[test]
    fn test_earliest_storable_is_4713_bc() {
        let floor = earliest_storable();
        assert_eq!(floor.date_naive(), NaiveDate::from_ymd_opt(-4712, 1, 1).unwrap());
        assert!(floor > DateTime::<Utc>::MIN_UTC);
    }
}
