//! Publisher abstraction: moves document content to durable storage

use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use super::document::Document;

/// Failure reported by a publisher backend
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PublishError {
    #[error("Publisher transport error: {0}")]
    Transport(String),

    #[error("Publisher rejected document: {0}")]
    Rejected(String),

    #[error("Document has no payload to publish")]
    MissingPayload,
}

/// Transfers a document to its destination and returns where it landed.
///
/// Latency is unbounded from the caller's point of view.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DocumentPublisher: Send + Sync {
    async fn publish(&self, document: &Document) -> Result<String, PublishError>;
}
