//! Bounded hand-off queue between upload intake and the upload processor

use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::domain::{DocumentId, DomainError};

/// Outstanding entries allowed before producers are suspended
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("queue operation cancelled")]
    Cancelled,

    #[error("queue closed")]
    Closed,
}

impl From<QueueError> for DomainError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::Cancelled => DomainError::cancelled("Upload queue operation cancelled"),
            QueueError::Closed => DomainError::internal("Upload queue is closed"),
        }
    }
}

/// FIFO of document IDs awaiting publication.
///
/// Producers suspend while the queue is full; the consumer suspends while it is
/// empty. Both waits end early when the caller's token is cancelled. Nothing is
/// persisted: entries still queued when the process stops are lost.
#[derive(Debug)]
pub struct UploadQueue {
    sender: mpsc::Sender<DocumentId>,
    receiver: Mutex<mpsc::Receiver<DocumentId>>,
    capacity: usize,
}

impl UploadQueue {
    /// Create a queue holding at most `capacity` outstanding IDs
    pub fn bounded(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = mpsc::channel(capacity);

        Self {
            sender,
            receiver: Mutex::new(receiver),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of IDs currently waiting
    pub fn len(&self) -> usize {
        self.capacity - self.sender.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append an ID, waiting for room while the queue is full
    pub async fn enqueue(
        &self,
        id: DocumentId,
        cancel: &CancellationToken,
    ) -> Result<(), QueueError> {
        if cancel.is_cancelled() {
            return Err(QueueError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(QueueError::Cancelled),
            permit = self.sender.reserve() => {
                let permit = permit.map_err(|_| QueueError::Closed)?;
                permit.send(id);
                Ok(())
            }
        }
    }

    /// Take the oldest ID, waiting while the queue is empty
    pub async fn dequeue(&self, cancel: &CancellationToken) -> Result<DocumentId, QueueError> {
        if cancel.is_cancelled() {
            return Err(QueueError::Cancelled);
        }

        let mut receiver = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(QueueError::Cancelled),
            guard = self.receiver.lock() => guard,
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(QueueError::Cancelled),
            id = receiver.recv() => id.ok_or(QueueError::Closed),
        }
    }
}

impl Default for UploadQueue {
    fn default() -> Self {
        Self::bounded(DEFAULT_QUEUE_CAPACITY)
    }
}
