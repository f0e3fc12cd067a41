use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};

use super::columns::now;
use super::errors::RepositoryError;
use crate::database::DatabasePool;
use crate::models::{DocumentRecord, DocumentSummary, NewDocument};

/// Repository trait for uploaded documents
#[async_trait]
pub trait DocumentRepositoryTrait: Send + Sync {
    async fn create(&self, document: NewDocument) -> Result<DocumentRecord, RepositoryError>;

    /// Newest documents of a profile
    async fn list_for_profile(&self, profile_id: i64, limit: u32) -> Result<Vec<DocumentSummary>, RepositoryError>;

    /// A document when its profile belongs to the user
    async fn get_for_user(&self, document_id: i64, user_id: i64) -> Result<Option<DocumentRecord>, RepositoryError>;
}

/// SQLite-backed document repository
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: DatabasePool,
}

impl DocumentRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn map_document(row: &rusqlite::Row<'_>) -> rusqlite::Result<DocumentRecord> {
    Ok(DocumentRecord {
        id: row.get(0)?,
        health_profile_id: row.get(1)?,
        filename: row.get(2)?,
        original_content: row.get(3)?,
        ai_summary: row.get(4)?,
        file_type: row.get(5)?,
        file_size: row.get(6)?,
        uploaded_at: row.get(7)?,
    })
}

#[async_trait]
impl DocumentRepositoryTrait for DocumentRepository {
    async fn create(&self, document: NewDocument) -> Result<DocumentRecord, RepositoryError> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO documents
                (health_profile_id, filename, original_content, ai_summary, file_type, file_size, uploaded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                document.health_profile_id,
                document.filename,
                document.original_content,
                document.ai_summary,
                document.file_type,
                document.file_size,
                now()
            ],
        )?;
        let id = conn.last_insert_rowid();
        let record = conn.query_row(
            "SELECT id, health_profile_id, filename, original_content, ai_summary, file_type, file_size, uploaded_at
             FROM documents WHERE id = ?1",
            [id],
            map_document,
        )?;
        Ok(record)
    }

    async fn list_for_profile(&self, profile_id: i64, limit: u32) -> Result<Vec<DocumentSummary>, RepositoryError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, filename, ai_summary, file_size, uploaded_at FROM documents
             WHERE health_profile_id = ?1
             ORDER BY uploaded_at DESC, id DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![profile_id, limit], |row| {
            Ok(DocumentSummary {
                id: row.get(0)?,
                filename: row.get(1)?,
                ai_summary: row.get(2)?,
                file_size: row.get(3)?,
                uploaded_at: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    async fn get_for_user(&self, document_id: i64, user_id: i64) -> Result<Option<DocumentRecord>, RepositoryError> {
        let conn = self.pool.get()?;
        let document = conn
            .query_row(
                "SELECT d.id, d.health_profile_id, d.filename, d.original_content, d.ai_summary,
                        d.file_type, d.file_size, d.uploaded_at
                 FROM documents d
                 JOIN health_profiles p ON p.id = d.health_profile_id
                 WHERE d.id = ?1 AND p.user_id = ?2",
                params![document_id, user_id],
                map_document,
            )
            .optional()?;
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::{insert_profile, insert_user, test_pool};

    fn document(profile_id: i64, name: &str) -> NewDocument {
        NewDocument {
            health_profile_id: profile_id,
            filename: name.to_string(),
            original_content: "glucose 7.2 mmol/L".to_string(),
            ai_summary: "- elevated glucose".to_string(),
            file_type: "pdf".to_string(),
            file_size: 1024,
        }
    }

    #[tokio::test]
    async fn list_is_newest_first_and_limited() {
        let pool = test_pool();
        let user = insert_user(&pool, "d@x.io");
        let profile = insert_profile(&pool, user, "Main");
        let repo = DocumentRepository::new(pool);

        for i in 0..3 {
            repo.create(document(profile, &format!("lab-{}.pdf", i))).await.unwrap();
        }

        let listed = repo.list_for_profile(profile, 2).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].filename, "lab-2.pdf");
        assert_eq!(listed[0].file_size, Some(1024));
    }

    #[tokio::test]
    async fn get_checks_owner_through_profile() {
        let pool = test_pool();
        let owner = insert_user(&pool, "owner@x.io");
        let other = insert_user(&pool, "other@x.io");
        let profile = insert_profile(&pool, owner, "Main");
        let repo = DocumentRepository::new(pool);

        let doc = repo.create(document(profile, "lab.pdf")).await.unwrap();

        assert!(repo.get_for_user(doc.id, other).await.unwrap().is_none());
        let found = repo.get_for_user(doc.id, owner).await.unwrap().unwrap();
        assert_eq!(found.original_content.as_deref(), Some("glucose 7.2 mmol/L"));
    }
}
