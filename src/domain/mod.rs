//! Domain layer - Core business logic and entities

pub mod document;
pub mod error;
pub mod publisher;

pub use document::{
    Channel, Document, DocumentError, DocumentId, DocumentRepository, DocumentSearchCriteria,
    DocumentStatus, DocumentType, NewDocument, PagedResult, SortDirection, SortField,
};
pub use error::DomainError;
pub use publisher::{DocumentPublisher, PublishError};
