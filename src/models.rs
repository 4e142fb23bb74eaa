//! Entity models: users, posts and polymorphic replies
//!
//! Every table carries `id`, `created_at`, `updated_at` and the soft delete
//! marker `deleted_at`.

use crate::errors::CommentableError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgTypeInfo, PgValueRef, Postgres};
use std::fmt;
use std::str::FromStr;
use store_object::{Id, SqlValue, TableMetadata};
use table_derive::model;

/// The three entity kinds, used to label errors and log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Post,
    Reply,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::User => "User",
            EntityKind::Post => "Post",
            EntityKind::Reply => "Reply",
        })
    }
}

/// A table-backed entity of the commentable graph
pub trait Entity: TableMetadata {
    const KIND: EntityKind;
}

/// Stored `parent_type` tag of a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParentKind {
    Post,
    Reply,
}

impl ParentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParentKind::Post => "Post",
            ParentKind::Reply => "Reply",
        }
    }
}

impl fmt::Display for ParentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParentKind {
    type Err = CommentableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Post" => Ok(ParentKind::Post),
            "Reply" => Ok(ParentKind::Reply),
            other => Err(CommentableError::InvalidArgument(format!(
                "unknown parent kind '{}'",
                other
            ))),
        }
    }
}

/// Typed reference to the parent of a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentRef {
    Post(Id),
    Reply(Id),
}

impl ParentRef {
    pub fn new(kind: ParentKind, id: Id) -> Self {
        match kind {
            ParentKind::Post => ParentRef::Post(id),
            ParentKind::Reply => ParentRef::Reply(id),
        }
    }

    /// Build a reference from an untyped `(parent_type, parent_id)` pair
    pub fn parse(kind: &str, id: Id) -> Result<Self, CommentableError> {
        Ok(Self::new(kind.parse()?, id))
    }

    pub fn kind(&self) -> ParentKind {
        match self {
            ParentRef::Post(_) => ParentKind::Post,
            ParentRef::Reply(_) => ParentKind::Reply,
        }
    }

    pub fn id(&self) -> Id {
        match self {
            ParentRef::Post(id) | ParentRef::Reply(id) => *id,
        }
    }
}

impl fmt::Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.id())
    }
}

impl From<ParentKind> for SqlValue {
    fn from(kind: ParentKind) -> Self {
        SqlValue::Text(kind.as_str().to_string())
    }
}

// Stored as TEXT; decoding goes through `FromStr` so unknown tags fail the row
impl sqlx::Type<Postgres> for ParentKind {
    fn type_info() -> PgTypeInfo {
        <&str as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <&str as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> sqlx::Decode<'r, Postgres> for ParentKind {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let tag = <&str as sqlx::Decode<Postgres>>::decode(value)?;
        Ok(tag.parse::<ParentKind>()?)
    }
}

// ========================================
// User
// ========================================

#[model]
#[table(name = "users")]
pub struct User {
    #[primary_key]
    pub id: Id,

    #[field(create)]
    pub name: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[soft_delete]
    #[index]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;
}

// ========================================
// Post
// ========================================

#[model]
#[table(name = "posts")]
pub struct Post {
    #[primary_key]
    pub id: Id,

    #[field(create)]
    pub title: String,

    #[field(create)]
    pub content: String,

    #[field(create)]
    #[index]
    #[column(references = "users")]
    pub user_id: Id,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[soft_delete]
    #[index]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for Post {
    const KIND: EntityKind = EntityKind::Post;
}

// ========================================
// Reply
// ========================================

/// A reply attached to a post or to a reply of a post.
/// The parent is polymorphic: no foreign key backs `(parent_type, parent_id)`.
#[model]
#[table(name = "replies")]
#[index(parent_type, parent_id)]
pub struct Reply {
    #[primary_key]
    pub id: Id,

    #[field(create)]
    pub content: String,

    #[field(create)]
    #[column(references = "users")]
    pub user_id: Id,

    #[field(create)]
    #[column(sql_type = "TEXT", check = "parent_type IN ('Post', 'Reply')")]
    pub parent_type: ParentKind,

    #[field(create)]
    pub parent_id: Id,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[soft_delete]
    #[index]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Reply {
    pub fn parent(&self) -> ParentRef {
        ParentRef::new(self.parent_type, self.parent_id)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl NewReply {
    pub fn new(content: &str, user_id: Id, parent: ParentRef) -> Self {
        Self {
            content: content.to_string(),
            user_id,
            parent_type: parent.kind(),
            parent_id: parent.id(),
        }
    }

    pub fn parent(&self) -> ParentRef {
        ParentRef::new(self.parent_type, self.parent_id)
    }
}

impl Entity for Reply {
    const KIND: EntityKind = EntityKind::Reply;
}

#[cfg(test)]
mod tests {
    use super::*;
    use store_object::Insertable;

    #[test]
    fn test_parent_ref_parse() {
        assert_eq!(ParentRef::parse("Post", 3).unwrap(), ParentRef::Post(3));
        assert_eq!(ParentRef::parse("Reply", 4).unwrap(), ParentRef::Reply(4));
        assert!(matches!(
            ParentRef::parse("post", 3),
            Err(CommentableError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_reply_draft_values() {
        let draft = NewReply::new("hi", 1, ParentRef::Reply(9));
        let values = draft.values();
        assert!(values.contains(&("parent_type", SqlValue::Text("Reply".into()))));
        assert!(values.contains(&("parent_id", SqlValue::Int(9))));
    }

    #[test]
    fn test_parent_kind_serializes_as_tag() {
        assert_eq!(serde_json::to_value(ParentKind::Post).unwrap(), "Post");
        let kind: ParentKind = serde_json::from_value(serde_json::json!("Reply")).unwrap();
        assert_eq!(kind, ParentKind::Reply);
    }

    #[test]
    fn test_reply_table_definition() {
        assert_eq!(Reply::table_name(), "replies");
        assert_eq!(Reply::soft_delete_field(), Some("deleted_at"));
        assert_eq!(
            Reply::columns(),
            &[
                "id",
                "content",
                "user_id",
                "parent_type",
                "parent_id",
                "created_at",
                "updated_at",
                "deleted_at",
            ]
        );

        let sql = Reply::create_table_sql();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS replies ("));
        assert!(sql.contains("id BIGSERIAL PRIMARY KEY"));
        assert!(sql.contains("user_id BIGINT NOT NULL REFERENCES users (id)"));
        assert!(sql.contains("parent_type TEXT NOT NULL CHECK (parent_type IN ('Post', 'Reply'))"));
        assert!(sql.contains("parent_id BIGINT NOT NULL,"));
        assert!(sql.contains("created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()"));
        assert!(sql.contains("deleted_at TIMESTAMPTZ\n)"));

        assert_eq!(
            Reply::create_indexes_sql(),
            vec![
                "CREATE INDEX IF NOT EXISTS idx_replies_parent_type_parent_id ON replies (parent_type, parent_id)",
                "CREATE INDEX IF NOT EXISTS idx_replies_deleted_at ON replies (deleted_at)",
            ]
        );
    }

    #[test]
    fn test_drafts_carry_only_create_fields() {
        let draft = NewUser {
            name: "ada".to_string(),
        };
        assert_eq!(draft.values(), vec![("name", SqlValue::Text("ada".into()))]);

        let draft = NewPost {
            title: "t".to_string(),
            content: "c".to_string(),
            user_id: 2,
        };
        let columns: Vec<&str> = draft.values().into_iter().map(|(column, _)| column).collect();
        assert_eq!(columns, vec!["title", "content", "user_id"]);
        assert_eq!(Post::primary_key_field(), "id");
        assert!(Post::create_indexes_sql()[0].contains("idx_posts_user_id"));
    }
}
