//! Application state for shared services

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::infrastructure::queue::UploadQueue;
use crate::infrastructure::services::DocumentServiceTrait;

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub document_service: Arc<dyn DocumentServiceTrait>,
    /// Read by the readiness probe
    pub queue: Arc<UploadQueue>,
    /// Cancelled on shutdown; aborts uploads waiting for queue space
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        document_service: Arc<dyn DocumentServiceTrait>,
        queue: Arc<UploadQueue>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            document_service,
            queue,
            shutdown,
        }
    }
}
