use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::{info, instrument, warn};

use health_food_domain::auth::CurrentUser;
use health_food_domain::entities::{Document, DocumentListItem, DocumentUpload, UploadedDocument};

use crate::api::state::AppState;
use crate::entities::common::{ApiResult, ErrorResponse};
use crate::entities::documents::DocumentUploadForm;

/// Read the named file field of a multipart body
pub async fn read_file_field(multipart: &mut Multipart, field_name: &str) -> ApiResult<(String, Vec<u8>)> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!("Malformed multipart body: {}", e);
        ErrorResponse::bad_request("Malformed multipart body")
    })? {
        if field.name() != Some(field_name) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(|e| {
            warn!("Could not read upload: {}", e);
            ErrorResponse::bad_request("Could not read uploaded file")
        })?;
        return Ok((filename, bytes.to_vec()));
    }
    Err(ErrorResponse::bad_request(format!("Missing '{}' field", field_name)))
}

/// Upload a PDF medical record and summarize it
#[utoipa::path(
    post,
    path = "/api/profiles/{profile_id}/documents",
    params(("profile_id" = i64, Path, description = "Profile ID")),
    request_body(content = DocumentUploadForm, content_type = "multipart/form-data", description = "PDF in the `file` field"),
    responses(
        (status = 201, description = "Document stored with its summary", body = UploadedDocument),
        (status = 400, description = "Not a PDF, too large or unreadable", body = ErrorResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse),
        (status = 502, description = "AI summary failed", body = ErrorResponse),
        (status = 503, description = "AI not configured", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "documents"
)]
#[instrument(skip(state, user, multipart), fields(user_id = user.id))]
pub async fn upload_document(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(profile_id): Path<i64>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let (filename, bytes) = read_file_field(&mut multipart, "file").await?;
    info!("Received {} ({} bytes)", filename, bytes.len());

    let uploaded = state
        .services
        .documents
        .upload(profile_id, user.id, DocumentUpload { filename, bytes })
        .await?;
    Ok((StatusCode::CREATED, Json(uploaded)))
}

#[utoipa::path(
    get,
    path = "/api/profiles/{profile_id}/documents",
    params(("profile_id" = i64, Path, description = "Profile ID")),
    responses(
        (status = 200, description = "Documents, newest first", body = [DocumentListItem]),
        (status = 404, description = "Profile not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "documents"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn list_documents(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(profile_id): Path<i64>,
) -> ApiResult<Json<Vec<DocumentListItem>>> {
    Ok(Json(state.services.documents.list(profile_id, user.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/documents/{doc_id}",
    params(("doc_id" = i64, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document with extracted text", body = Document),
        (status = 404, description = "Document not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "documents"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn get_document(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(doc_id): Path<i64>,
) -> ApiResult<Json<Document>> {
    Ok(Json(state.services.documents.get(doc_id, user.id).await?))
}
