use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// An uploaded file before it is processed
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct UploadedDocument {
    pub document_id: i64,
    pub summary: String,
}

/// A medical document with its extracted text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Document {
    pub id: i64,
    pub health_profile_id: i64,
    pub filename: String,
    pub original_content: Option<String>,
    pub ai_summary: Option<String>,
    pub file_type: String,
    pub file_size: Option<i64>,
    pub uploaded_at: String,
}

/// Document row in a profile listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct DocumentListItem {
    pub id: i64,
    pub filename: String,
    pub ai_summary: Option<String>,
    pub file_size: Option<i64>,
    pub uploaded_at: String,
}
