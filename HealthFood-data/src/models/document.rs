use serde::{Deserialize, Serialize};

/// Stored document with its extracted text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: i64,
    pub health_profile_id: i64,
    pub filename: String,
    pub original_content: Option<String>,
    pub ai_summary: Option<String>,
    pub file_type: String,
    pub file_size: Option<i64>,
    pub uploaded_at: String,
}

/// Listing entry for a document, without the extracted text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: i64,
    pub filename: String,
    pub ai_summary: Option<String>,
    pub file_size: Option<i64>,
    pub uploaded_at: String,
}

/// Input for storing an uploaded document
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub health_profile_id: i64,
    pub filename: String,
    pub original_content: String,
    pub ai_summary: String,
    pub file_type: String,
    pub file_size: i64,
}
