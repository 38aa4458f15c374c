//! Simulated publisher that pretends to upload to object storage

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::{Document, DocumentPublisher, PublishError};

pub const DEFAULT_BASE_URL: &str = "https://storage.documents.local";

/// Publisher configuration
#[derive(Debug, Clone)]
pub struct InMemoryPublisherConfig {
    /// Prefix for generated location references
    pub base_url: String,
    /// Artificial delay applied to every publish
    pub latency: Duration,
}

impl Default for InMemoryPublisherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            latency: Duration::from_secs(2),
        }
    }
}

/// Publisher that only waits and builds a URL; nothing leaves the process
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentPublisher {
    config: InMemoryPublisherConfig,
}

impl InMemoryDocumentPublisher {
    pub fn new(config: InMemoryPublisherConfig) -> Self {
        Self { config }
    }

    fn location_for(&self, document: &Document) -> String {
        format!(
            "{}/documents/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            document.id(),
            document.filename()
        )
    }
}

#[async_trait]
impl DocumentPublisher for InMemoryDocumentPublisher {
    async fn publish(&self, document: &Document) -> Result<String, PublishError> {
        if document.payload().is_none() {
            return Err(PublishError::MissingPayload);
        }

        debug!(
            document_id = %document.id(),
            filename = %document.filename(),
            size = document.size(),
            "Publishing document"
        );

        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }

        let location = self.location_for(document);
        info!(document_id = %document.id(), location = %location, "Document published");

        Ok(location)
    }
}
