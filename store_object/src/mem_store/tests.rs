use super::MemStore;
use crate::errors::StoreError;
use crate::query_builder::{QueryBuilder, QueryFilter, SortOrder, UpdateSet};
use crate::test_model::{NewNote, NewTag, Note, Tag};
use crate::traits::{run_in_transaction, Session, Store, UnitOfWork};
use chrono::{Duration, Utc};

async fn seeded(titles: &[(&str, i64)]) -> (MemStore, Vec<Note>) {
    let store = MemStore::new();
    let mut session = store.session().await.unwrap();
    let mut notes = Vec::new();
    for (title, rank) in titles {
        notes.push(session.create::<Note>(NewNote::new(title, *rank)).await.unwrap());
    }
    (store, notes)
}

#[tokio::test]
async fn test_create_assigns_ids_and_timestamps() {
    let (_, notes) = seeded(&[("a", 1), ("b", 2)]).await;

    assert_eq!(notes[0].id, 1);
    assert_eq!(notes[1].id, 2);
    assert_eq!(notes[0].title, "a");
    assert!(notes[0].deleted_at.is_none());
    assert_eq!(notes[0].created_at, notes[0].updated_at);
}

#[tokio::test]
async fn test_find_orders_and_limits() {
    let (store, _) = seeded(&[("a", 3), ("b", 1), ("c", 2)]).await;
    let mut session = store.session().await.unwrap();

    let by_rank = session
        .find::<Note>(QueryBuilder::new().order_by("rank", SortOrder::Desc).limit(2))
        .await
        .unwrap();
    let titles: Vec<_> = by_rank.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, vec!["a", "c"]);

    let default_order = session.find::<Note>(QueryBuilder::new()).await.unwrap();
    let ids: Vec<_> = default_order.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_soft_delete_hides_rows_unless_included() {
    let (store, notes) = seeded(&[("a", 1), ("b", 2)]).await;
    let mut session = store.session().await.unwrap();
    let at = Utc::now() - Duration::days(2);

    session.soft_delete::<Note>(notes[0].id, at).await.unwrap();

    assert_eq!(session.count_where::<Note>(QueryBuilder::new()).await.unwrap(), 1);
    assert_eq!(
        session
            .count_where::<Note>(QueryBuilder::new().include_deleted(true))
            .await
            .unwrap(),
        2
    );
    assert!(session.get_by_id::<Note>(notes[0].id, false).await.unwrap_err().is_not_found());

    let deleted = session.get_by_id::<Note>(notes[0].id, true).await.unwrap();
    assert_eq!(deleted.deleted_at, Some(at));
}

#[tokio::test]
async fn test_soft_delete_keeps_first_timestamp() {
    let (store, notes) = seeded(&[("a", 1)]).await;
    let mut session = store.session().await.unwrap();
    let first = Utc::now() - Duration::days(5);

    session.soft_delete::<Note>(notes[0].id, first).await.unwrap();
    session.soft_delete::<Note>(notes[0].id, Utc::now()).await.unwrap();

    let note = session.get_by_id::<Note>(notes[0].id, true).await.unwrap();
    assert_eq!(note.deleted_at, Some(first));

    let missing = session.soft_delete::<Note>(99, Utc::now()).await.unwrap_err();
    assert!(matches!(missing, StoreError::NotFound { table: "notes", id: 99 }));
}

#[tokio::test]
async fn test_soft_delete_unsupported_table() {
    let store = MemStore::new();
    let mut session = store.session().await.unwrap();
    let tag = session.create::<Tag>(NewTag("x".into())).await.unwrap();

    let err = session.soft_delete::<Tag>(tag.id, Utc::now()).await.unwrap_err();
    assert!(matches!(err, StoreError::SoftDeleteUnsupported { table: "tags" }));
}

#[tokio::test]
async fn test_update_where_refreshes_updated_at() {
    let (store, notes) = seeded(&[("a", 1), ("b", 5)]).await;
    let mut session = store.session().await.unwrap();

    let changed = session
        .update_where::<Note>(
            QueryBuilder::new().filter(QueryFilter::gt("rank", 2)),
            UpdateSet::new().set("title", "big"),
        )
        .await
        .unwrap();
    assert_eq!(changed, 1);

    let b = session.get_by_id::<Note>(notes[1].id, false).await.unwrap();
    assert_eq!(b.title, "big");
    assert!(b.updated_at >= notes[1].updated_at);

    let err = session
        .update_where::<Note>(QueryBuilder::new(), UpdateSet::new().set("id", 10))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::UnknownField { .. }));
}

#[tokio::test]
async fn test_delete_where_respects_scope() {
    let (store, notes) = seeded(&[("a", 1), ("b", 2), ("c", 3)]).await;
    let mut session = store.session().await.unwrap();
    session.soft_delete::<Note>(notes[0].id, Utc::now()).await.unwrap();

    // Soft-deleted rows are only removed when the query includes them
    let removed = session
        .delete_where::<Note>(QueryBuilder::new().filter(QueryFilter::lte("rank", 2)))
        .await
        .unwrap();
    assert_eq!(removed, 1);

    let removed = session
        .delete_where::<Note>(
            QueryBuilder::new()
                .include_deleted(true)
                .filter(QueryFilter::is_not_null("deleted_at")),
        )
        .await
        .unwrap();
    assert_eq!(removed, 1);

    let left = session
        .find::<Note>(QueryBuilder::new().include_deleted(true))
        .await
        .unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].title, "c");
}

#[tokio::test]
async fn test_update_where_backdates_deleted_rows() {
    let (store, notes) = seeded(&[("a", 1)]).await;
    let old = Utc::now() - Duration::days(61);

    let mut session = store.session().await.unwrap();

    session.soft_delete::<Note>(notes[0].id, Utc::now()).await.unwrap();
    let changed = session
        .update_where::<Note>(
            QueryBuilder::by_id(notes[0].id).include_deleted(true),
            UpdateSet::new().set("deleted_at", old),
        )
        .await
        .unwrap();
    assert_eq!(changed, 1);

    let aged = session
        .find::<Note>(
            QueryBuilder::new()
                .include_deleted(true)
                .filter(QueryFilter::lt("deleted_at", Utc::now() - Duration::days(60))),
        )
        .await
        .unwrap();
    assert_eq!(aged.len(), 1);
}

#[tokio::test]
async fn test_transaction_commit_publishes_writes() {
    let (store, notes) = seeded(&[("a", 1), ("b", 2)]).await;

    let mut tx = store.begin().await.unwrap();
    tx.soft_delete::<Note>(notes[0].id, Utc::now()).await.unwrap();
    tx.create::<Note>(NewNote::new("c", 3)).await.unwrap();
    tx.commit().await.unwrap();

    let mut session = store.session().await.unwrap();
    assert_eq!(session.count_where::<Note>(QueryBuilder::new()).await.unwrap(), 2);
}

#[tokio::test]
async fn test_transaction_rollback_discards_writes() {
    let (store, notes) = seeded(&[("a", 1)]).await;

    let mut tx = store.begin().await.unwrap();
    tx.soft_delete::<Note>(notes[0].id, Utc::now()).await.unwrap();
    tx.create::<Note>(NewNote::new("b", 2)).await.unwrap();
    tx.rollback().await.unwrap();

    let mut session = store.session().await.unwrap();
    let all = session
        .find::<Note>(QueryBuilder::new().include_deleted(true))
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
    assert!(all[0].deleted_at.is_none());
}

#[tokio::test]
async fn test_run_in_transaction_rolls_back_on_error() {
    let (store, notes) = seeded(&[("a", 1)]).await;
    let id = notes[0].id;

    let result: Result<(), StoreError> = run_in_transaction(&store, move |tx| {
        Box::pin(async move {
            tx.soft_delete::<Note>(id, Utc::now()).await?;
            tx.soft_delete::<Note>(id + 100, Utc::now()).await
        })
    })
    .await;
    assert!(result.unwrap_err().is_not_found());

    let mut session = store.session().await.unwrap();
    let note = session.get_by_id::<Note>(id, false).await.unwrap();
    assert!(note.deleted_at.is_none());
}
