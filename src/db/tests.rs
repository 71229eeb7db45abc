use super::*;
use crate::store::NewDocument;
use tempfile::tempdir;

async fn create_test_db() -> (Database, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();
    let db = Database::new(&temp_dir.path().join("test.db"))
        .await
        .unwrap();
    (db, temp_dir)
}

fn sheet_document(id: &str, content: &str) -> NewDocument {
    NewDocument {
        id: DocumentId::from(id),
        title: "company webset for \"fintech\"".to_string(),
        kind: ArtifactKind::Sheet,
        content: content.to_string(),
        user_id: Some("user-1".to_string()),
    }
}

#[tokio::test]
async fn save_and_get_round_trip() {
    let (db, _tmp) = create_test_db().await;

    db.save_document(&sheet_document("doc-1", "name,url\n\"A\",\"a.com\"\n"))
        .await
        .unwrap();

    let doc = db
        .get_document(&DocumentId::from("doc-1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(doc.id.as_str(), "doc-1");
    assert_eq!(doc.kind, ArtifactKind::Sheet);
    assert_eq!(doc.content, "name,url\n\"A\",\"a.com\"\n");
    assert_eq!(doc.user_id.as_deref(), Some("user-1"));
}

#[tokio::test]
async fn get_missing_document_returns_none() {
    let (db, _tmp) = create_test_db().await;
    let doc = db.get_document(&DocumentId::from("nope")).await.unwrap();
    assert!(doc.is_none());
}

#[tokio::test]
async fn saving_same_id_twice_keeps_one_row_with_latest_content() {
    let (db, _tmp) = create_test_db().await;

    db.save_document(&sheet_document("doc-1", "v1"))
        .await
        .unwrap();
    db.save_document(&sheet_document("doc-1", "v2"))
        .await
        .unwrap();

    let docs = db.list_documents_for_user("user-1").await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].content, "v2");
}

#[tokio::test]
async fn list_is_scoped_to_the_user() {
    let (db, _tmp) = create_test_db().await;

    db.save_document(&sheet_document("doc-1", "a")).await.unwrap();
    let mut other = sheet_document("doc-2", "b");
    other.user_id = Some("user-2".to_string());
    db.save_document(&other).await.unwrap();

    let docs = db.list_documents_for_user("user-1").await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id.as_str(), "doc-1");
}

#[tokio::test]
async fn delete_document_removes_the_row() {
    let (db, _tmp) = create_test_db().await;

    db.save_document(&sheet_document("doc-1", "a")).await.unwrap();
    db.delete_document(&DocumentId::from("doc-1")).await.unwrap();

    assert!(
        db.get_document(&DocumentId::from("doc-1"))
            .await
            .unwrap()
            .is_none()
    );
    assert!(db.delete_document(&DocumentId::from("doc-1")).await.is_err());
}

#[tokio::test]
async fn reopening_the_database_preserves_documents() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("test.db");

    {
        let db = Database::new(&path).await.unwrap();
        db.save_document(&sheet_document("doc-1", "persisted"))
            .await
            .unwrap();
        db.close().await;
    }

    let db = Database::new(&path).await.unwrap();
    let doc = db
        .get_document(&DocumentId::from("doc-1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(doc.content, "persisted");
}
