//! Document persistence interface
//!
//! The artifact store is an external collaborator: the populate loop only
//! needs a save operation called once at the end of an invocation, keyed by
//! document id. [`crate::db::Database`] is the bundled SQLite
//! implementation; embedders can supply their own.

use crate::error::Result;
use crate::types::{ArtifactKind, DocumentId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// New document to be persisted
#[derive(Debug, Clone)]
pub struct NewDocument {
    /// Document id (stable across updates of the same artifact)
    pub id: DocumentId,
    /// Display title
    pub title: String,
    /// Artifact kind
    pub kind: ArtifactKind,
    /// Full document content (CSV text for sheets)
    pub content: String,
    /// Owning user, when known
    pub user_id: Option<String>,
}

/// Persisted document record
#[derive(Debug, Clone)]
pub struct Document {
    /// Document id
    pub id: DocumentId,
    /// Display title
    pub title: String,
    /// Artifact kind
    pub kind: ArtifactKind,
    /// Full document content
    pub content: String,
    /// Owning user, when known
    pub user_id: Option<String>,
    /// When the document was first saved
    pub created_at: DateTime<Utc>,
    /// When the document was last saved
    pub updated_at: DateTime<Utc>,
}

/// Persistence surface consumed by the tools
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Save a document, replacing any previous content under the same id
    async fn save_document(&self, document: NewDocument) -> Result<()>;

    /// Fetch a document by id
    async fn get_document(&self, id: &DocumentId) -> Result<Option<Document>>;
}
