//! Integration tests against PostgreSQL
//!
//! Skipped unless `DATABASE_URL` is set. Each test resets the schema, so they
//! run one at a time.

use chrono::{Duration, Utc};
use commentable::prelude::*;
use serial_test::serial;

async fn setup() -> Option<Commentable<PgStore>> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping PostgreSQL test");
        return None;
    };

    let config = AppConfig {
        database: DatabaseConfig::default().with_url(database_url),
        policy: PolicyConfig::default(),
    };
    let policy = Commentable::<PgStore>::connect(&config)
        .await
        .expect("Failed to connect to database");
    policy.reset_schema().await.expect("Failed to drop tables");
    policy.migrate().await.expect("Failed to create tables");
    Some(policy)
}

#[tokio::test]
#[serial]
async fn test_pg_delete_post_leaves_no_live_replies() {
    let Some(policy) = setup().await else { return };

    let user = policy.create_user("User A").await.unwrap();
    let post = policy
        .create_post(user.id, "Post Title", "Post Content")
        .await
        .unwrap();
    let reply = policy
        .create_reply("Reply 1", user.id, ParentRef::Post(post.id))
        .await
        .unwrap();
    let nested = policy
        .create_reply("Reply 1.1", user.id, ParentRef::Reply(reply.id))
        .await
        .unwrap();

    let err = policy
        .create_reply("Reply 1.1.1", user.id, ParentRef::Reply(nested.id))
        .await
        .unwrap_err();
    assert!(matches!(err, CommentableError::InvalidNesting { .. }));

    let outcome = policy.delete_post(post.id).await.unwrap();
    assert_eq!(outcome.replies_soft_deleted, 1);

    let parent = ParentRef::Post(post.id);
    assert_eq!(policy.count_replies(parent, false).await.unwrap(), 0);
    assert_eq!(policy.count_replies(parent, true).await.unwrap(), 1);

    let fetched = policy.get::<Reply>(reply.id, true).await.unwrap();
    assert_eq!(fetched.parent_type, ParentKind::Post);
    assert!(fetched.is_deleted());
}

#[tokio::test]
#[serial]
async fn test_pg_sweep_after_60_days() {
    let Some(policy) = setup().await else { return };

    let user = policy.create_user("User A").await.unwrap();
    let post = policy
        .create_post(user.id, "Post Title", "Post Content")
        .await
        .unwrap();
    let parent = ParentRef::Post(post.id);
    for i in 0..10 {
        policy
            .create_reply(&format!("Reply #{}", i), user.id, parent)
            .await
            .unwrap();
    }
    assert_eq!(policy.soft_delete_replies(parent).await.unwrap(), 10);

    let replies = policy.find_replies(parent, true).await.unwrap();
    let day_minus_61 = Utc::now() - Duration::days(61);
    let mut session = policy.store().session().await.unwrap();
    for reply in replies.iter().take(5) {
        session
            .update_where::<Reply>(
                QueryBuilder::by_id(reply.id).include_deleted(true),
                UpdateSet::new().set("deleted_at", day_minus_61),
            )
            .await
            .unwrap();
    }
    drop(session);

    assert_eq!(policy.hard_delete_older_than(60).await.unwrap(), 5);
    assert_eq!(policy.hard_delete_older_than(60).await.unwrap(), 0);

    let remaining = policy.find_replies(parent, true).await.unwrap();
    assert_eq!(remaining.len(), 5);
    assert!(remaining.iter().all(Reply::is_deleted));
}

#[tokio::test]
#[serial]
async fn test_pg_delete_missing_post_is_not_found() {
    let Some(policy) = setup().await else { return };

    let err = policy.delete_post(12345).await.unwrap_err();
    assert!(matches!(err, CommentableError::NotFound { kind: EntityKind::Post, .. }));
    policy.store().health_check().await.unwrap();
}

#[tokio::test]
#[serial]
async fn test_pg_sweep_window_before_4713_bc_removes_nothing() {
    let Some(policy) = setup().await else { return };
    let user = policy.create_user("User A").await.unwrap();
    let post = policy.create_post(user.id, "Post Title", "Post Content").await.unwrap();
    let parent = ParentRef::Post(post.id);
    policy.create_reply("Reply 1", user.id, parent).await.unwrap();
    policy.soft_delete_replies(parent).await.unwrap();

    assert_eq!(policy.hard_delete_older_than(3_000_000).await.unwrap(), 0);
    assert_eq!(policy.count_replies(parent, true).await.unwrap(), 1);
}
