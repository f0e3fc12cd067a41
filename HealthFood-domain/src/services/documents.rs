use std::sync::Arc;

use tracing::{error, info};

use health_food_data::models::NewDocument;
use health_food_data::repository::{DocumentRepositoryTrait, HealthProfileRepositoryTrait};

use crate::ai::prompts::summarize_medical_text;
use crate::ai::ChatModel;
use crate::entities::conversions::{convert_to_domain_document, convert_to_domain_document_item};
use crate::entities::{Document, DocumentListItem, DocumentUpload, UploadedDocument};
use crate::errors::{ServiceError, ServiceResult};
use crate::pdf::{extract_text_from_pdf, is_pdf_filename};

use super::owned_profile;

/// Largest accepted upload
pub const MAX_DOCUMENT_BYTES: usize = 20 * 1024 * 1024;

const LIST_LIMIT: u32 = 20;

/// PDF medical records summarized by the AI
#[derive(Clone)]
pub struct DocumentService {
    documents: Arc<dyn DocumentRepositoryTrait>,
    profiles: Arc<dyn HealthProfileRepositoryTrait>,
    model: Arc<dyn ChatModel>,
    language: String,
}

impl DocumentService {
    pub fn new(
        documents: Arc<dyn DocumentRepositoryTrait>,
        profiles: Arc<dyn HealthProfileRepositoryTrait>,
        model: Arc<dyn ChatModel>,
        language: String,
    ) -> Self {
        Self {
            documents,
            profiles,
            model,
            language,
        }
    }

    /// Extract, summarize and store an uploaded PDF
    pub async fn upload(&self, profile_id: i64, user_id: i64, upload: DocumentUpload) -> ServiceResult<UploadedDocument> {
        owned_profile(self.profiles.as_ref(), profile_id, user_id).await?;

        if !is_pdf_filename(&upload.filename) {
            return Err(ServiceError::Validation("Only PDF files are supported".to_string()));
        }
        if upload.bytes.len() > MAX_DOCUMENT_BYTES {
            return Err(ServiceError::Validation("File exceeds the 20 MiB limit".to_string()));
        }

        let file_size = upload.bytes.len() as i64;
        let text = extract_text_from_pdf(upload.bytes).await?;

        let summary = summarize_medical_text(self.model.as_ref(), &text, &self.language)
            .await
            .map_err(|e| {
                error!("Document summary failed for {}: {}", upload.filename, e);
                ServiceError::Upstream(format!("Could not summarize document: {}", e))
            })?;

        let record = self
            .documents
            .create(NewDocument {
                health_profile_id: profile_id,
                filename: upload.filename,
                original_content: text,
                ai_summary: summary.clone(),
                file_type: "pdf".to_string(),
                file_size,
            })
            .await?;

        info!("Stored document {} for profile {}", record.id, profile_id);
        Ok(UploadedDocument {
            document_id: record.id,
            summary,
        })
    }

    pub async fn list(&self, profile_id: i64, user_id: i64) -> ServiceResult<Vec<DocumentListItem>> {
        owned_profile(self.profiles.as_ref(), profile_id, user_id).await?;

        let items = self.documents.list_for_profile(profile_id, LIST_LIMIT).await?;
        Ok(items.into_iter().map(convert_to_domain_document_item).collect())
    }

    pub async fn get(&self, document_id: i64, user_id: i64) -> ServiceResult<Document> {
        self.documents
            .get_for_user(document_id, user_id)
            .await?
            .map(convert_to_domain_document)
            .ok_or_else(|| ServiceError::NotFound("Document not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AiError, ChatMessage, MockChatModel};
    use crate::pdf::fixtures::{missing_font_pdf, text_pdf};
    use health_food_data::repository::testing::{insert_profile, insert_user, test_pool};
    use health_food_data::repository::{DocumentRepository, HealthProfileRepository};

    fn service(model: MockChatModel) -> (DocumentService, i64, i64) {
        let pool = test_pool();
        let user_id = insert_user(&pool, "lan@example.com");
        let profile_id = insert_profile(&pool, user_id, "Me");
        let service = DocumentService::new(
            Arc::new(DocumentRepository::new(pool.clone())),
            Arc::new(HealthProfileRepository::new(pool)),
            Arc::new(model),
            "English".to_string(),
        );
        (service, user_id, profile_id)
    }

    #[tokio::test]
    async fn non_pdf_uploads_are_rejected() {
        let (service, user_id, profile_id) = service(MockChatModel::new());

        let err = service
            .upload(
                profile_id,
                user_id,
                DocumentUpload {
                    filename: "scan.png".to_string(),
                    bytes: vec![1, 2, 3],
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn oversized_uploads_are_rejected() {
        let (service, user_id, profile_id) = service(MockChatModel::new());

        let err = service
            .upload(
                profile_id,
                user_id,
                DocumentUpload {
                    filename: "big.PDF".to_string(),
                    bytes: vec![0; MAX_DOCUMENT_BYTES + 1],
                },
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("20 MiB"));
    }

    #[tokio::test]
    async fn unparsable_pdf_is_a_validation_error() {
        let (service, user_id, profile_id) = service(MockChatModel::new());

        let err = service
            .upload(
                profile_id,
                user_id,
                DocumentUpload {
                    filename: "report.pdf".to_string(),
                    bytes: b"definitely not a pdf".to_vec(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn undeclared_font_is_a_validation_error() {
        let (service, user_id, profile_id) = service(MockChatModel::new());

        let err = service
            .upload(
                profile_id,
                user_id,
                DocumentUpload {
                    filename: "report.pdf".to_string(),
                    bytes: missing_font_pdf(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn upload_stores_text_summary_and_size() {
        let mut model = MockChatModel::new();
        model
            .expect_complete()
            .withf(|request| request.messages[1].text().contains("HbA1c"))
            .times(1)
            .returning(|_| Ok(ChatMessage::assistant("- HbA1c above target")));
        let (service, user_id, profile_id) = service(model);
        let bytes = text_pdf("HbA1c 8.1");
        let size = bytes.len() as i64;

        let uploaded = service
            .upload(
                profile_id,
                user_id,
                DocumentUpload {
                    filename: "lab.pdf".to_string(),
                    bytes,
                },
            )
            .await
            .unwrap();
        assert_eq!(uploaded.summary, "- HbA1c above target");

        let stored = service.get(uploaded.document_id, user_id).await.unwrap();
        assert_eq!(stored.filename, "lab.pdf");
        assert_eq!(stored.file_type, "pdf");
        assert_eq!(stored.file_size, Some(size));
        assert_eq!(stored.ai_summary.as_deref(), Some("- HbA1c above target"));
        assert!(stored.original_content.unwrap_or_default().contains("HbA1c"));

        let listed = service.list(profile_id, user_id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, uploaded.document_id);
    }

    #[tokio::test]
    async fn summary_failure_is_upstream_and_stores_nothing() {
        let mut model = MockChatModel::new();
        model
            .expect_complete()
            .returning(|_| Err(AiError::Status { status: 500, body: "boom".to_string() }));
        let (service, user_id, profile_id) = service(model);

        let err = service
            .upload(
                profile_id,
                user_id,
                DocumentUpload {
                    filename: "lab.pdf".to_string(),
                    bytes: text_pdf("HbA1c 8.1"),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Upstream(_)));
        assert!(service.list(profile_id, user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listing_keeps_the_newest_twenty() {
        let pool = test_pool();
        let user_id = insert_user(&pool, "lan@example.com");
        let profile_id = insert_profile(&pool, user_id, "Me");
        let documents = DocumentRepository::new(pool.clone());
        for i in 0..22 {
            documents
                .create(NewDocument {
                    health_profile_id: profile_id,
                    filename: format!("lab-{}.pdf", i),
                    original_content: String::new(),
                    ai_summary: String::new(),
                    file_type: "pdf".to_string(),
                    file_size: 1,
                })
                .await
                .unwrap();
        }
        let service = DocumentService::new(
            Arc::new(documents),
            Arc::new(HealthProfileRepository::new(pool)),
            Arc::new(MockChatModel::new()),
            "English".to_string(),
        );

        assert_eq!(service.list(profile_id, user_id).await.unwrap().len(), 20);
    }

    #[tokio::test]
    async fn foreign_profile_is_not_found() {
        let (service, _, profile_id) = service(MockChatModel::new());

        let err = service.list(profile_id, 999).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert!(matches!(service.get(1, 999).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn empty_profile_lists_nothing() {
        let (service, user_id, profile_id) = service(MockChatModel::new());
        assert!(service.list(profile_id, user_id).await.unwrap().is_empty());
    }
}
