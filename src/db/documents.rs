//! Document artifact CRUD.

use crate::error::DatabaseError;
use crate::store::{Document, DocumentStore, NewDocument};
use crate::types::DocumentId;
use crate::{Error, Result};
use async_trait::async_trait;

use super::{Database, DocumentRow};

impl Database {
    /// Save a document, upserting by id
    ///
    /// A repeat save under the same id replaces the title, kind, content and
    /// owner while keeping the original `created_at`.
    pub async fn save_document(&self, document: &NewDocument) -> Result<()> {
        let now = chrono::Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO documents (id, title, kind, content, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                kind = excluded.kind,
                content = excluded.content,
                user_id = excluded.user_id,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(document.id.as_str())
        .bind(&document.title)
        .bind(document.kind.to_string())
        .bind(&document.content)
        .bind(&document.user_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to save document: {}",
                e
            )))
        })?;

        Ok(())
    }

    /// Fetch a document by id
    pub async fn get_document(&self, id: &DocumentId) -> Result<Option<Document>> {
        let row: Option<DocumentRow> = sqlx::query_as(
            "SELECT id, title, kind, content, user_id, created_at, updated_at
             FROM documents WHERE id = ?",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to fetch document: {}",
                e
            )))
        })?;

        Ok(row.map(Document::from))
    }

    /// List documents owned by a user, most recently updated first
    pub async fn list_documents_for_user(&self, user_id: &str) -> Result<Vec<Document>> {
        let rows: Vec<DocumentRow> = sqlx::query_as(
            "SELECT id, title, kind, content, user_id, created_at, updated_at
             FROM documents WHERE user_id = ? ORDER BY updated_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to list documents: {}",
                e
            )))
        })?;

        Ok(rows.into_iter().map(Document::from).collect())
    }

    /// Delete a document by id
    pub async fn delete_document(&self, id: &DocumentId) -> Result<()> {
        let result = sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to delete document: {}",
                    e
                )))
            })?;

        if result.rows_affected() == 0 {
            return Err(Error::Database(DatabaseError::NotFound(format!(
                "document {}",
                id
            ))));
        }

        Ok(())
    }
}

#[async_trait]
impl DocumentStore for Database {
    async fn save_document(&self, document: NewDocument) -> Result<()> {
        Database::save_document(self, &document).await
    }

    async fn get_document(&self, id: &DocumentId) -> Result<Option<Document>> {
        Database::get_document(self, id).await
    }
}
