use utoipa::ToSchema;

/// Multipart form of a medical record upload
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct DocumentUploadForm {
    /// PDF file, 20 MiB at most
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}
