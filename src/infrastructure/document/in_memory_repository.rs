//! In-memory document repository implementation

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::document::{
    Document, DocumentId, DocumentRepository, DocumentSearchCriteria, PagedResult,
};
use crate::domain::error::DomainError;

/// In-memory implementation of DocumentRepository
///
/// Data is lost when the process terminates.
#[derive(Debug, Clone)]
pub struct InMemoryDocumentRepository {
    documents: Arc<RwLock<HashMap<String, Document>>>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a repository pre-populated with documents
    pub fn with_documents(documents: Vec<Document>) -> Self {
        let map = documents
            .into_iter()
            .map(|doc| (doc.id().as_str().to_string(), doc))
            .collect();

        Self {
            documents: Arc::new(RwLock::new(map)),
        }
    }
}

impl Default for InMemoryDocumentRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn get(&self, id: &DocumentId) -> Result<Option<Document>, DomainError> {
        let documents = self.documents.read().await;
        Ok(documents.get(id.as_str()).cloned())
    }

    async fn create(&self, document: Document) -> Result<Document, DomainError> {
        let mut documents = self.documents.write().await;
        let id = document.id().as_str().to_string();

        if documents.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "Document '{}' already exists",
                id
            )));
        }

        documents.insert(id, document.clone());
        Ok(document)
    }

    async fn update(&self, document: &Document) -> Result<Document, DomainError> {
        let mut documents = self.documents.write().await;
        let id = document.id().as_str().to_string();

        if !documents.contains_key(&id) {
            return Err(DomainError::not_found(format!("Document '{}'", id)));
        }

        documents.insert(id, document.clone());
        Ok(document.clone())
    }

    async fn search(
        &self,
        criteria: &DocumentSearchCriteria,
    ) -> Result<PagedResult<Document>, DomainError> {
        let documents = self.documents.read().await;

        let mut matching: Vec<&Document> = documents
            .values()
            .filter(|doc| criteria.matches(doc))
            .collect();
        let total_count = matching.len();

        matching.sort_by(|a, b| criteria.compare(a, b));

        let items = matching
            .into_iter()
            .skip(criteria.skip())
            .take(criteria.page_size)
            .cloned()
            .collect();

        Ok(PagedResult::new(
            items,
            total_count,
            criteria.page_number,
            criteria.page_size,
        ))
    }

    async fn count(&self, criteria: &DocumentSearchCriteria) -> Result<usize, DomainError> {
        let documents = self.documents.read().await;
        Ok(documents.values().filter(|doc| criteria.matches(doc)).count())
    }
}
