//! Document upload and status endpoints

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::api::state::AppState;
use crate::api::types::{
    ApiError, DocumentPageResponse, DocumentResponse, DocumentSearchParams, Json, UploadAccepted,
};
use crate::domain::{Channel, DocumentSearchCriteria, DocumentType, PagedResult};
use crate::infrastructure::services::UploadDocumentRequest;

/// Largest file accepted by the multipart upload
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png", "docx", "xlsx", "txt"];

/// POST /v1/documents - Upload a base64 encoded document
pub async fn upload_document(
    State(state): State<AppState>,
    Json(request): Json<UploadDocumentRequest>,
) -> Result<(StatusCode, Json<UploadAccepted>), ApiError> {
    let id = state
        .document_service
        .submit(request, &state.shutdown)
        .await?;

    Ok((StatusCode::ACCEPTED, Json(UploadAccepted::new(id))))
}

/// POST /v1/documents/upload-file - Upload a raw file via multipart form
///
/// Fields: `file` (required), `document_type`, `channel`, and optionally
/// `customer_id` and `correlation_id`.
pub async fn upload_document_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadAccepted>), ApiError> {
    let mut form = FileUploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| {
                    ApiError::bad_request(format!("Failed to read uploaded file: {}", e))
                })?;
                form.file = Some(UploadedFile {
                    filename: filename.unwrap_or_default(),
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            "document_type" => form.document_type = Some(parse_enum_field(&name, field).await?),
            "channel" => form.channel = Some(parse_enum_field(&name, field).await?),
            "customer_id" => form.customer_id = Some(text_field(&name, field).await?),
            "correlation_id" => form.correlation_id = Some(text_field(&name, field).await?),
            other => debug!(field = %other, "Ignoring unknown multipart field"),
        }
    }

    let request = form.into_request()?;
    info!(
        filename = %request.filename,
        content_type = %request.content_type,
        "Received multipart upload"
    );

    let id = state
        .document_service
        .submit(request, &state.shutdown)
        .await?;

    Ok((StatusCode::ACCEPTED, Json(UploadAccepted::new(id))))
}

/// GET /v1/documents - Search documents
pub async fn search_documents(
    State(state): State<AppState>,
    Query(params): Query<DocumentSearchParams>,
) -> Result<(HeaderMap, Json<DocumentPageResponse>), ApiError> {
    let criteria = DocumentSearchCriteria::from(params);
    let page = state.document_service.search(criteria).await?;

    let headers = pagination_headers(&page);
    Ok((headers, Json(DocumentPageResponse::from(page))))
}

/// GET /v1/documents/{document_id} - Poll a single document
pub async fn get_document(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let document = state.document_service.get(&document_id).await?;

    match document {
        Some(doc) => Ok(Json(DocumentResponse::from(doc))),
        None => Err(ApiError::not_found(format!(
            "Document '{}' not found",
            document_id
        ))),
    }
}

#[derive(Debug, Default)]
struct FileUploadForm {
    file: Option<UploadedFile>,
    document_type: Option<DocumentType>,
    channel: Option<Channel>,
    customer_id: Option<String>,
    correlation_id: Option<String>,
}

#[derive(Debug)]
struct UploadedFile {
    filename: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

impl FileUploadForm {
    fn into_request(self) -> Result<UploadDocumentRequest, ApiError> {
        let file = self
            .file
            .ok_or_else(|| ApiError::bad_request("No file provided").with_param("file"))?;
        validate_file(&file.filename, file.bytes.len())?;

        let document_type = self.document_type.ok_or_else(|| {
            ApiError::bad_request("document_type is required").with_param("document_type")
        })?;
        let channel = self
            .channel
            .ok_or_else(|| ApiError::bad_request("channel is required").with_param("channel"))?;

        Ok(UploadDocumentRequest {
            content_type: file
                .content_type
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            encoded_file: STANDARD.encode(&file.bytes),
            filename: file.filename,
            document_type,
            channel,
            customer_id: self.customer_id.filter(|c| !c.is_empty()),
            correlation_id: self.correlation_id.filter(|c| !c.is_empty()),
        })
    }
}

/// Check an uploaded file against the size and extension limits
pub fn validate_file(filename: &str, size: usize) -> Result<(), ApiError> {
    if size == 0 {
        return Err(ApiError::bad_request("No file provided").with_param("file"));
    }

    if size > MAX_FILE_SIZE {
        return Err(ApiError::bad_request(format!(
            "File exceeds the maximum allowed size of {}MB",
            MAX_FILE_SIZE / 1024 / 1024
        ))
        .with_param("file"));
    }

    let extension = std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ApiError::bad_request(format!(
            "File type not allowed. Allowed extensions: {}",
            ALLOWED_EXTENSIONS.join(", ")
        ))
        .with_param("file"));
    }

    Ok(())
}

async fn text_field(
    name: &str,
    field: axum::extract::multipart::Field<'_>,
) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map(|text| text.trim().to_string())
        .map_err(|e| ApiError::bad_request(format!("Failed to read field '{}': {}", name, e)))
}

async fn parse_enum_field<T: DeserializeOwned>(
    name: &str,
    field: axum::extract::multipart::Field<'_>,
) -> Result<T, ApiError> {
    let text = text_field(name, field).await?;
    serde_json::from_value(serde_json::Value::String(text.clone())).map_err(|_| {
        ApiError::bad_request(format!("Invalid value '{}' for {}", text, name)).with_param(name)
    })
}

fn pagination_headers<T>(page: &PagedResult<T>) -> HeaderMap {
    let values = [
        ("x-pagination-total-count", page.total_count.to_string()),
        ("x-pagination-page-number", page.page_number.to_string()),
        ("x-pagination-page-size", page.page_size.to_string()),
        ("x-pagination-total-pages", page.total_pages().to_string()),
        (
            "x-pagination-has-previous-page",
            page.has_previous_page().to_string(),
        ),
        ("x-pagination-has-next-page", page.has_next_page().to_string()),
    ];

    let mut headers = HeaderMap::with_capacity(values.len());
    for (name, value) in values {
        if let Ok(value) = HeaderValue::from_str(&value) {
            headers.insert(HeaderName::from_static(name), value);
        }
    }
    headers
}
