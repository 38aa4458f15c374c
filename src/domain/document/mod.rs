//! Document domain module: records, lifecycle and search

mod entity;
mod error;
pub mod repository;
mod search;

pub use entity::{
    validate_document_id, Channel, Document, DocumentId, DocumentStatus, DocumentType,
    NewDocument, MAX_ID_LENGTH,
};
pub use error::DocumentError;
pub use repository::DocumentRepository;
pub use search::{
    DocumentSearchCriteria, PagedResult, SortDirection, SortField, DEFAULT_PAGE_SIZE,
    MAX_PAGE_SIZE,
};

#[cfg(test)]
pub(crate) use entity::test_support;
#[cfg(test)]
pub use repository::MockDocumentRepository;
