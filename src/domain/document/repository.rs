//! Document repository trait

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::{Document, DocumentId, DocumentSearchCriteria, PagedResult};
use crate::domain::error::DomainError;

/// Durable record of documents and their current status.
///
/// Each call is atomic for a single record; nothing here spans records.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Get a document by ID
    async fn get(&self, id: &DocumentId) -> Result<Option<Document>, DomainError>;

    /// Persist a new document, fails with `Conflict` if the ID exists
    async fn create(&self, document: Document) -> Result<Document, DomainError>;

    /// Replace an existing document, fails with `NotFound` if absent
    async fn update(&self, document: &Document) -> Result<Document, DomainError>;

    /// Filter, sort and page documents
    async fn search(
        &self,
        criteria: &DocumentSearchCriteria,
    ) -> Result<PagedResult<Document>, DomainError>;

    /// Count documents matching the criteria filters (paging is ignored)
    async fn count(&self, criteria: &DocumentSearchCriteria) -> Result<usize, DomainError>;
}
