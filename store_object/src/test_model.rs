//! Minimal soft-deletable model shared by unit tests

use crate::traits::{Insertable, TableMetadata};
use crate::value::SqlValue;
use crate::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Note {
    pub id: Id,
    pub title: String,
    pub rank: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewNote {
    pub title: String,
    pub rank: i64,
}

impl NewNote {
    pub fn new(title: &str, rank: i64) -> Self {
        Self {
            title: title.to_string(),
            rank,
        }
    }
}

impl Insertable for NewNote {
    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("title", self.title.clone().into()),
            ("rank", self.rank.into()),
        ]
    }
}

impl TableMetadata for Note {
    type Draft = NewNote;

    fn table_name() -> &'static str {
        "notes"
    }

    fn columns() -> &'static [&'static str] {
        &["id", "title", "rank", "created_at", "updated_at", "deleted_at"]
    }

    fn soft_delete_field() -> Option<&'static str> {
        Some("deleted_at")
    }

    fn extract_id(&self) -> Id {
        self.id
    }

    fn create_table_sql() -> String {
        "CREATE TABLE IF NOT EXISTS notes (
            id BIGSERIAL PRIMARY KEY,
            title TEXT NOT NULL,
            rank BIGINT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            deleted_at TIMESTAMPTZ
        )"
        .to_string()
    }
}

/// Hard-delete-only table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: Id,
    pub label: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTag(pub String);

impl Insertable for NewTag {
    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![("label", self.0.clone().into())]
    }
}

impl TableMetadata for Tag {
    type Draft = NewTag;

    fn table_name() -> &'static str {
        "tags"
    }

    fn columns() -> &'static [&'static str] {
        &["id", "label", "created_at", "updated_at"]
    }

    fn extract_id(&self) -> Id {
        self.id
    }

    fn create_table_sql() -> String {
        "CREATE TABLE IF NOT EXISTS tags (id BIGSERIAL PRIMARY KEY, label TEXT NOT NULL)".to_string()
    }
}
