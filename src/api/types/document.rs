//! Document request and response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Channel, Document, DocumentId, DocumentSearchCriteria, DocumentStatus, DocumentType,
    PagedResult, SortDirection, SortField,
};

/// Returned with 202 Accepted once a document is queued
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadAccepted {
    pub id: DocumentId,
    pub status: DocumentStatus,
}

impl UploadAccepted {
    pub fn new(id: DocumentId) -> Self {
        Self {
            id,
            status: DocumentStatus::Received,
        }
    }
}

/// Document metadata as exposed over HTTP; the payload is never returned
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResponse {
    pub id: DocumentId,
    pub filename: String,
    pub content_type: String,
    pub document_type: DocumentType,
    pub channel: Channel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    pub correlation_id: String,
    pub status: DocumentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id().clone(),
            filename: doc.filename().to_string(),
            content_type: doc.content_type().to_string(),
            document_type: doc.document_type(),
            channel: doc.channel(),
            customer_id: doc.customer_id().map(String::from),
            correlation_id: doc.correlation_id().to_string(),
            status: doc.status(),
            location: doc.location().map(String::from),
            size: doc.size(),
            uploaded_at: doc.uploaded_at(),
            processed_at: doc.processed_at(),
        }
    }
}

/// Search page body; the same numbers are mirrored in `X-Pagination-*` headers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentPageResponse {
    pub items: Vec<DocumentResponse>,
    pub total_count: usize,
    pub page_number: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl From<PagedResult<Document>> for DocumentPageResponse {
    fn from(page: PagedResult<Document>) -> Self {
        let total_pages = page.total_pages();
        let has_previous_page = page.has_previous_page();
        let has_next_page = page.has_next_page();
        let page = page.map(DocumentResponse::from);

        Self {
            items: page.items,
            total_count: page.total_count,
            page_number: page.page_number,
            page_size: page.page_size,
            total_pages,
            has_previous_page,
            has_next_page,
        }
    }
}

/// Query parameters for `GET /v1/documents`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentSearchParams {
    pub uploaded_from: Option<DateTime<Utc>>,
    pub uploaded_to: Option<DateTime<Utc>>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub document_type: Option<DocumentType>,
    pub status: Option<DocumentStatus>,
    pub customer_id: Option<String>,
    pub channel: Option<Channel>,
    pub sort_by: Option<SortField>,
    pub sort_direction: Option<SortDirection>,
    pub page_number: Option<usize>,
    pub page_size: Option<usize>,
}

impl From<DocumentSearchParams> for DocumentSearchCriteria {
    fn from(params: DocumentSearchParams) -> Self {
        let defaults = DocumentSearchCriteria::default();

        Self {
            uploaded_from: params.uploaded_from,
            uploaded_to: params.uploaded_to,
            filename: params.filename,
            content_type: params.content_type,
            document_type: params.document_type,
            status: params.status,
            customer_id: params.customer_id,
            channel: params.channel,
            sort_by: params.sort_by.unwrap_or(defaults.sort_by),
            sort_direction: params.sort_direction.unwrap_or(defaults.sort_direction),
            page_number: params.page_number.unwrap_or(defaults.page_number),
            page_size: params.page_size.unwrap_or(defaults.page_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::test_support::received_document;

    #[test]
    fn test_response_omits_payload() {
        let doc = received_document(b"secret bytes");
        let json = serde_json::to_value(DocumentResponse::from(doc)).unwrap();

        assert_eq!(json["status"], "received");
        assert_eq!(json["size"], 12);
        assert!(json.get("payload").is_none());
        assert!(json.get("location").is_none());
    }

    #[test]
    fn test_sent_response_has_location() {
        let mut doc = received_document(b"abc");
        doc.mark_sent("loc://abc").unwrap();

        let response = DocumentResponse::from(doc);
        assert_eq!(response.status, DocumentStatus::Sent);
        assert_eq!(response.location.as_deref(), Some("loc://abc"));
        assert!(response.processed_at.is_some());
    }

    #[test]
    fn test_params_fill_defaults() {
        let criteria = DocumentSearchCriteria::from(DocumentSearchParams {
            status: Some(DocumentStatus::Failed),
            ..Default::default()
        });

        assert_eq!(criteria.status, Some(DocumentStatus::Failed));
        assert_eq!(criteria.page_number, 1);
        assert_eq!(criteria.page_size, 10);
        assert_eq!(criteria.sort_by, SortField::UploadDate);
    }

    #[test]
    fn test_params_from_query_string() {
        let params: DocumentSearchParams = parse_query(
            "channel=branch&sort_by=filename&sort_direction=desc&page_size=25",
        );
        let criteria = DocumentSearchCriteria::from(params);

        assert_eq!(criteria.channel, Some(Channel::Branch));
        assert_eq!(criteria.sort_by, SortField::Filename);
        assert_eq!(criteria.sort_direction, SortDirection::Desc);
        assert_eq!(criteria.page_size, 25);
    }

    fn parse_query(query: &str) -> DocumentSearchParams {
        let uri: axum::http::Uri = format!("/v1/documents?{}", query).parse().unwrap();
        axum::extract::Query::<DocumentSearchParams>::try_from_uri(&uri)
            .unwrap()
            .0
    }

    #[test]
    fn test_page_response_flags() {
        let docs = (0..3).map(|_| received_document(b"x")).collect();
        let page = PagedResult::new(docs, 7, 2, 3);

        let response = DocumentPageResponse::from(page);
        assert_eq!(response.items.len(), 3);
        assert_eq!(response.total_pages, 3);
        assert!(response.has_previous_page);
        assert!(response.has_next_page);
    }
}
