//! Database layer for webset-tools
//!
//! Handles SQLite persistence for document artifacts.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] — Database lifecycle, schema migrations
//! - [`documents`] — Document artifact CRUD

use crate::store::Document;
use crate::types::{ArtifactKind, DocumentId};
use sqlx::{FromRow, sqlite::SqlitePool};

mod documents;
mod migrations;

/// Document record from database (raw from SQLite)
#[derive(Debug, Clone, FromRow)]
pub struct DocumentRow {
    /// Document id
    pub id: String,
    /// Display title
    pub title: String,
    /// Artifact kind as stored ("text", "code", "image", "sheet")
    pub kind: String,
    /// Full document content
    pub content: String,
    /// Owning user id
    pub user_id: Option<String>,
    /// Unix timestamp when the document was first saved
    pub created_at: i64,
    /// Unix timestamp when the document was last saved
    pub updated_at: i64,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        use chrono::{TimeZone, Utc};

        let kind = match row.kind.as_str() {
            "code" => ArtifactKind::Code,
            "image" => ArtifactKind::Image,
            "sheet" => ArtifactKind::Sheet,
            _ => ArtifactKind::Text,
        };

        Document {
            id: DocumentId::from(row.id),
            title: row.title,
            kind,
            content: row.content,
            user_id: row.user_id,
            created_at: Utc
                .timestamp_opt(row.created_at, 0)
                .single()
                .unwrap_or_else(Utc::now),
            updated_at: Utc
                .timestamp_opt(row.updated_at, 0)
                .single()
                .unwrap_or_else(Utc::now),
        }
    }
}

/// Database handle for webset-tools
pub struct Database {
    pool: SqlitePool,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
