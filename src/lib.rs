//! Document Gateway API
//!
//! Accepts document uploads, records them as `received` and hands them to a
//! background processor that publishes each one and records the outcome:
//! - Bounded upload queue with backpressure and cancellation
//! - Single background publisher with a pause after failures
//! - Status polling and search over stored documents

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use api::state::AppState;
use domain::{DocumentPublisher, DocumentRepository};
use infrastructure::{
    document::InMemoryDocumentRepository,
    publisher::{InMemoryDocumentPublisher, InMemoryPublisherConfig},
    queue::UploadQueue,
    services::DocumentService,
    worker::{UploadProcessor, UploadProcessorConfig},
};

/// Everything the server needs: HTTP state plus the processor that drains the queue
pub struct Application {
    pub state: AppState,
    pub processor: UploadProcessor,
    pub shutdown: CancellationToken,
}

/// Wire the application with default configuration
pub fn create_app() -> Application {
    create_app_with_config(&AppConfig::default())
}

/// Wire repository, queue, publisher, intake service and processor.
///
/// The queue is created once here and shared by the intake service and the
/// processor.
pub fn create_app_with_config(config: &AppConfig) -> Application {
    let shutdown = CancellationToken::new();

    let repository: Arc<dyn DocumentRepository> = Arc::new(InMemoryDocumentRepository::new());
    let publisher: Arc<dyn DocumentPublisher> =
        Arc::new(InMemoryDocumentPublisher::new(InMemoryPublisherConfig {
            base_url: config.publisher.base_url.clone(),
            latency: config.publisher.simulated_latency(),
        }));
    let queue = Arc::new(UploadQueue::bounded(config.queue.capacity));

    info!(
        queue_capacity = queue.capacity(),
        publisher_base_url = %config.publisher.base_url,
        "Document pipeline configured"
    );

    let document_service = Arc::new(DocumentService::new(repository.clone(), queue.clone()));
    let processor = UploadProcessor::new(
        queue.clone(),
        repository,
        publisher,
        UploadProcessorConfig {
            failure_pause: config.worker.failure_pause(),
        },
    );

    Application {
        state: AppState::new(document_service, queue, shutdown.clone()),
        processor,
        shutdown,
    }
}
