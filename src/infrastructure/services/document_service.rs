//! Document service: upload intake and status reads

use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::domain::{
    Channel, Document, DocumentId, DocumentRepository, DocumentSearchCriteria, DocumentType,
    DomainError, NewDocument, PagedResult,
};
use crate::infrastructure::observability::{record_document_received, record_queue_depth};
use crate::infrastructure::queue::UploadQueue;

/// Request to upload a base64 encoded document
#[derive(Debug, Clone, Deserialize)]
pub struct UploadDocumentRequest {
    pub filename: String,
    pub encoded_file: String,
    pub content_type: String,
    pub document_type: DocumentType,
    pub channel: Channel,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub correlation_id: Option<String>,
}

/// Trait for document service (for dynamic dispatch in AppState)
#[async_trait]
pub trait DocumentServiceTrait: Send + Sync {
    /// Persist a new document and queue it for publishing.
    ///
    /// Returns as soon as the record exists and its ID is queued; publishing
    /// happens later in the upload processor.
    async fn submit(
        &self,
        request: UploadDocumentRequest,
        cancel: &CancellationToken,
    ) -> Result<DocumentId, DomainError>;

    async fn get(&self, id: &str) -> Result<Option<Document>, DomainError>;

    async fn search(
        &self,
        criteria: DocumentSearchCriteria,
    ) -> Result<PagedResult<Document>, DomainError>;
}

/// Document service implementation
pub struct DocumentService {
    repository: Arc<dyn DocumentRepository>,
    queue: Arc<UploadQueue>,
}

impl std::fmt::Debug for DocumentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentService")
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}

impl DocumentService {
    pub fn new(repository: Arc<dyn DocumentRepository>, queue: Arc<UploadQueue>) -> Self {
        Self { repository, queue }
    }

    fn parse_id(&self, id: &str) -> Result<DocumentId, DomainError> {
        DocumentId::new(id).map_err(DomainError::from)
    }
}

/// Decode a base64 payload, ignoring embedded whitespace and line breaks
pub fn decode_payload(encoded: &str) -> Result<Vec<u8>, DomainError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| DomainError::invalid_encoding(format!("Invalid base64 encoded file: {}", e)))
}

#[async_trait]
impl DocumentServiceTrait for DocumentService {
    #[instrument(skip(self, request, cancel), fields(filename = %request.filename))]
    async fn submit(
        &self,
        request: UploadDocumentRequest,
        cancel: &CancellationToken,
    ) -> Result<DocumentId, DomainError> {
        let payload = decode_payload(&request.encoded_file).inspect_err(|e| {
            warn!(error = %e, "Rejected upload with malformed payload");
        })?;

        let correlation_id = request
            .correlation_id
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let document = Document::received(NewDocument {
            filename: request.filename,
            content_type: request.content_type,
            document_type: request.document_type,
            channel: request.channel,
            customer_id: request.customer_id,
            correlation_id,
            payload,
        });
        let id = document.id().clone();
        let channel = document.channel();
        let correlation_id = document.correlation_id().to_string();

        self.repository.create(document).await?;
        record_document_received(&channel.to_string());

        // The record stays `received` if this fails; nothing re-queues it.
        if let Err(e) = self.queue.enqueue(id.clone(), cancel).await {
            warn!(document_id = %id, error = %e, "Document persisted but could not be queued");
            return Err(e.into());
        }
        record_queue_depth(self.queue.len());

        info!(
            document_id = %id,
            correlation_id = %correlation_id,
            "Document upload accepted"
        );

        Ok(id)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: &str) -> Result<Option<Document>, DomainError> {
        let id = self.parse_id(id)?;
        self.repository.get(&id).await
    }

    #[instrument(skip(self, criteria))]
    async fn search(
        &self,
        criteria: DocumentSearchCriteria,
    ) -> Result<PagedResult<Document>, DomainError> {
        criteria.validate()?;

        let page = self.repository.search(&criteria).await?;
        info!(
            total_count = page.total_count,
            page_number = page.page_number,
            items = page.items.len(),
            "Document search completed"
        );

        Ok(page)
    }
}
