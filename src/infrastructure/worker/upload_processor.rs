//! Upload processor: drains the upload queue and publishes documents.
//!
//! A single consumer takes one document ID at a time, publishes the document and
//! records the terminal status. Each document gets exactly one publish attempt.
//! After any failure the processor pauses before taking the next ID, which also
//! stalls everything behind it in the queue.
//!
//! Shutdown: cancelling the token stops a pending dequeue or pause immediately.
//! A document already being processed is finished first.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::domain::{DocumentId, DocumentPublisher, DocumentRepository, DomainError};
use crate::infrastructure::observability::{
    record_document_failed, record_document_not_found, record_document_published,
    record_queue_depth, record_status_update_failure,
};
use crate::infrastructure::queue::{QueueError, UploadQueue};

#[derive(Debug, Clone)]
pub struct UploadProcessorConfig {
    /// Pause after a failed document before dequeuing again
    pub failure_pause: Duration,
}

impl Default for UploadProcessorConfig {
    fn default() -> Self {
        Self {
            failure_pause: Duration::from_secs(5),
        }
    }
}

/// Result of handling one dequeued ID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Published,
    /// No record for the ID; logged and skipped
    NotFound,
    /// Record already terminal; left untouched
    Skipped,
    Failed,
}

pub struct UploadProcessor {
    queue: Arc<UploadQueue>,
    repository: Arc<dyn DocumentRepository>,
    publisher: Arc<dyn DocumentPublisher>,
    config: UploadProcessorConfig,
}

impl UploadProcessor {
    pub fn new(
        queue: Arc<UploadQueue>,
        repository: Arc<dyn DocumentRepository>,
        publisher: Arc<dyn DocumentPublisher>,
        config: UploadProcessorConfig,
    ) -> Self {
        Self {
            queue,
            repository,
            publisher,
            config,
        }
    }

    /// Run the processor on its own task until `shutdown` is cancelled
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            failure_pause_secs = self.config.failure_pause.as_secs(),
            "Upload processor started"
        );

        loop {
            let id = match self.queue.dequeue(&shutdown).await {
                Ok(id) => id,
                Err(QueueError::Cancelled) => break,
                Err(QueueError::Closed) => {
                    warn!("Upload queue closed, stopping processor");
                    break;
                }
            };
            record_queue_depth(self.queue.len());

            if self.process(&id).await == ProcessOutcome::Failed {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(self.config.failure_pause) => {}
                }
            }
        }

        info!("Upload processor stopped");
    }

    /// Publish one document and record its terminal status
    pub async fn process(&self, id: &DocumentId) -> ProcessOutcome {
        let started = Instant::now();

        match self.publish(id).await {
            Ok(outcome) => {
                match outcome {
                    ProcessOutcome::Published => {
                        record_document_published(started.elapsed());
                        info!(document_id = %id, "Document processed");
                    }
                    ProcessOutcome::NotFound => {
                        record_document_not_found();
                        warn!(document_id = %id, "Document not found");
                    }
                    ProcessOutcome::Skipped => {
                        debug!(document_id = %id, "Document already in terminal state, skipping");
                    }
                    ProcessOutcome::Failed => {}
                }
                outcome
            }
            Err(e) => {
                error!(document_id = %id, error = %e, "Failed to process document");
                record_document_failed();
                self.mark_failed(id).await;
                ProcessOutcome::Failed
            }
        }
    }

    async fn publish(&self, id: &DocumentId) -> Result<ProcessOutcome, DomainError> {
        let Some(mut document) = self.repository.get(id).await? else {
            return Ok(ProcessOutcome::NotFound);
        };

        if document.is_terminal() {
            return Ok(ProcessOutcome::Skipped);
        }

        let location = self
            .publisher
            .publish(&document)
            .await
            .map_err(|e| DomainError::publish(e.to_string()))?;

        document.mark_sent(location)?;
        self.repository.update(&document).await?;

        Ok(ProcessOutcome::Published)
    }

    /// Best-effort move to `failed`. Errors are logged and counted, never retried.
    async fn mark_failed(&self, id: &DocumentId) {
        match self.try_mark_failed(id).await {
            Ok(true) => warn!(document_id = %id, "Marked document as failed"),
            Ok(false) => debug!(document_id = %id, "No received document to mark as failed"),
            Err(e) => {
                record_status_update_failure();
                error!(
                    document_id = %id,
                    error = %e,
                    "Failed to update document status"
                );
            }
        }
    }

    async fn try_mark_failed(&self, id: &DocumentId) -> Result<bool, DomainError> {
        let Some(mut document) = self.repository.get(id).await? else {
            return Ok(false);
        };

        if document.is_terminal() {
            return Ok(false);
        }

        document.mark_failed()?;
        self.repository.update(&document).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::domain::document::test_support::{new_document, received_document};
    use crate::domain::document::MockDocumentRepository;
    use crate::domain::publisher::MockDocumentPublisher;
    use crate::domain::{Document, DocumentStatus, PublishError};
    use crate::infrastructure::document::InMemoryDocumentRepository;

    fn named_document(filename: &str) -> Document {
        let mut new = new_document(b"0123456789");
        new.filename = filename.to_string();
        Document::received(new)
    }

    /// Publishes everything except files named `bad.pdf`
    fn selective_publisher() -> MockDocumentPublisher {
        let mut publisher = MockDocumentPublisher::new();
        publisher.expect_publish().returning(|doc| {
            if doc.filename() == "bad.pdf" {
                Err(PublishError::Transport("destination unavailable".to_string()))
            } else {
                Ok(format!("loc://{}", doc.id()))
            }
        });
        publisher
    }

    fn processor(
        queue: Arc<UploadQueue>,
        repo: Arc<dyn DocumentRepository>,
        publisher: impl DocumentPublisher + 'static,
    ) -> UploadProcessor {
        UploadProcessor::new(queue, repo, Arc::new(publisher), UploadProcessorConfig::default())
    }

    async fn wait_for_terminal(repo: &InMemoryDocumentRepository, id: &DocumentId) -> Document {
        for _ in 0..1000 {
            let doc = repo.get(id).await.unwrap().unwrap();
            if doc.is_terminal() {
                return doc;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("document {} never reached a terminal status", id);
    }

    #[tokio::test]
    async fn test_process_success_marks_sent() {
        let doc = received_document(&[9u8; 1024]);
        let id = doc.id().clone();
        let repo = InMemoryDocumentRepository::with_documents(vec![doc]);

        let mut publisher = MockDocumentPublisher::new();
        publisher
            .expect_publish()
            .times(1)
            .returning(|doc| Ok(format!("loc://{}", doc.id())));

        let processor = processor(
            Arc::new(UploadQueue::bounded(4)),
            Arc::new(repo.clone()),
            publisher,
        );

        assert_eq!(processor.process(&id).await, ProcessOutcome::Published);

        let stored = repo.get(&id).await.unwrap().unwrap();
        assert_eq!(stored.status(), DocumentStatus::Sent);
        assert_eq!(stored.location(), Some(format!("loc://{}", id).as_str()));
        assert!(stored.payload().is_none());
        assert_eq!(stored.size(), 1024);
    }

    #[tokio::test]
    async fn test_process_publish_error_marks_failed() {
        let doc = named_document("bad.pdf");
        let id = doc.id().clone();
        let repo = InMemoryDocumentRepository::with_documents(vec![doc]);

        let processor = processor(
            Arc::new(UploadQueue::bounded(4)),
            Arc::new(repo.clone()),
            selective_publisher(),
        );

        assert_eq!(processor.process(&id).await, ProcessOutcome::Failed);

        let stored = repo.get(&id).await.unwrap().unwrap();
        assert_eq!(stored.status(), DocumentStatus::Failed);
        assert!(stored.location().is_none());
        assert!(stored.payload().is_some());
    }

    #[tokio::test]
    async fn test_process_empty_location_marks_failed() {
        let doc = received_document(b"abc");
        let id = doc.id().clone();
        let repo = InMemoryDocumentRepository::with_documents(vec![doc]);

        let mut publisher = MockDocumentPublisher::new();
        publisher.expect_publish().returning(|_| Ok(String::new()));

        let processor = processor(
            Arc::new(UploadQueue::bounded(4)),
            Arc::new(repo.clone()),
            publisher,
        );

        assert_eq!(processor.process(&id).await, ProcessOutcome::Failed);
        let stored = repo.get(&id).await.unwrap().unwrap();
        assert_eq!(stored.status(), DocumentStatus::Failed);
    }

    #[tokio::test]
    async fn test_process_missing_document_is_skipped() {
        let mut publisher = MockDocumentPublisher::new();
        publisher.expect_publish().never();

        let processor = processor(
            Arc::new(UploadQueue::bounded(4)),
            Arc::new(InMemoryDocumentRepository::new()),
            publisher,
        );

        let outcome = processor.process(&DocumentId::generate()).await;
        assert_eq!(outcome, ProcessOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_process_terminal_document_is_not_mutated() {
        let mut doc = received_document(b"abc");
        doc.mark_failed().unwrap();
        let id = doc.id().clone();
        let repo = InMemoryDocumentRepository::with_documents(vec![doc]);

        let mut publisher = MockDocumentPublisher::new();
        publisher.expect_publish().never();

        let processor = processor(
            Arc::new(UploadQueue::bounded(4)),
            Arc::new(repo.clone()),
            publisher,
        );

        assert_eq!(processor.process(&id).await, ProcessOutcome::Skipped);
        let stored = repo.get(&id).await.unwrap().unwrap();
        assert_eq!(stored.status(), DocumentStatus::Failed);
    }

    #[tokio::test]
    async fn test_persist_failure_falls_back_to_failed() {
        let doc = received_document(b"abc");
        let id = doc.id().clone();

        let mut repo = MockDocumentRepository::new();
        let stored = doc.clone();
        repo.expect_get()
            .times(2)
            .returning(move |_| Ok(Some(stored.clone())));
        let updates = Arc::new(Mutex::new(Vec::new()));
        let seen = updates.clone();
        repo.expect_update().times(2).returning(move |doc| {
            seen.lock().unwrap().push(doc.status());
            if doc.status() == DocumentStatus::Sent {
                Err(DomainError::storage("write timeout"))
            } else {
                Ok(doc.clone())
            }
        });

        let mut publisher = MockDocumentPublisher::new();
        publisher
            .expect_publish()
            .times(1)
            .returning(|_| Ok("loc://x".to_string()));

        let processor = processor(Arc::new(UploadQueue::bounded(4)), Arc::new(repo), publisher);

        assert_eq!(processor.process(&id).await, ProcessOutcome::Failed);
        assert_eq!(
            *updates.lock().unwrap(),
            vec![DocumentStatus::Sent, DocumentStatus::Failed]
        );
    }

    #[tokio::test]
    async fn test_secondary_update_failure_is_swallowed() {
        let doc = named_document("bad.pdf");

        let mut repo = MockDocumentRepository::new();
        let stored = doc.clone();
        repo.expect_get()
            .times(2)
            .returning(move |_| Ok(Some(stored.clone())));
        repo.expect_update()
            .times(1)
            .returning(|_| Err(DomainError::storage("database unavailable")));

        let processor = processor(
            Arc::new(UploadQueue::bounded(4)),
            Arc::new(repo),
            selective_publisher(),
        );

        assert_eq!(processor.process(doc.id()).await, ProcessOutcome::Failed);
    }

    #[tokio::test]
    async fn test_fetch_failure_marks_failed_when_possible() {
        let doc = received_document(b"abc");
        let id = doc.id().clone();

        let mut repo = MockDocumentRepository::new();
        let mut calls = 0;
        let stored = doc.clone();
        repo.expect_get().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(DomainError::storage("connection reset"))
            } else {
                Ok(Some(stored.clone()))
            }
        });
        repo.expect_update()
            .times(1)
            .withf(|doc| doc.status() == DocumentStatus::Failed)
            .returning(|doc| Ok(doc.clone()));

        let mut publisher = MockDocumentPublisher::new();
        publisher.expect_publish().never();

        let processor = processor(Arc::new(UploadQueue::bounded(4)), Arc::new(repo), publisher);

        assert_eq!(processor.process(&id).await, ProcessOutcome::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_processes_queue_in_order() {
        let docs: Vec<Document> = ["a.pdf", "b.pdf", "c.pdf"]
            .into_iter()
            .map(named_document)
            .collect();
        let ids: Vec<DocumentId> = docs.iter().map(|d| d.id().clone()).collect();
        let repo = InMemoryDocumentRepository::with_documents(docs);
        let queue = Arc::new(UploadQueue::bounded(4));

        let order = Arc::new(Mutex::new(Vec::new()));
        let seen = order.clone();
        let mut publisher = MockDocumentPublisher::new();
        publisher.expect_publish().times(3).returning(move |doc| {
            seen.lock().unwrap().push(doc.id().clone());
            Ok(format!("loc://{}", doc.id()))
        });

        let shutdown = CancellationToken::new();
        for id in &ids {
            queue.enqueue(id.clone(), &shutdown).await.unwrap();
        }

        let handle = processor(queue.clone(), Arc::new(repo.clone()), publisher)
            .spawn(shutdown.clone());

        for id in &ids {
            assert_eq!(wait_for_terminal(&repo, id).await.status(), DocumentStatus::Sent);
        }
        assert_eq!(*order.lock().unwrap(), ids);

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_pauses_after_failure() {
        let bad = named_document("bad.pdf");
        let good = named_document("good.pdf");
        let (bad_id, good_id) = (bad.id().clone(), good.id().clone());
        let repo = InMemoryDocumentRepository::with_documents(vec![bad, good]);
        let queue = Arc::new(UploadQueue::bounded(4));

        let calls = Arc::new(Mutex::new(Vec::new()));
        let seen = calls.clone();
        let mut publisher = MockDocumentPublisher::new();
        publisher.expect_publish().times(2).returning(move |doc| {
            seen.lock().unwrap().push(Instant::now());
            if doc.filename() == "bad.pdf" {
                Err(PublishError::Rejected("checksum mismatch".to_string()))
            } else {
                Ok(format!("loc://{}", doc.id()))
            }
        });

        let shutdown = CancellationToken::new();
        queue.enqueue(bad_id.clone(), &shutdown).await.unwrap();
        queue.enqueue(good_id.clone(), &shutdown).await.unwrap();

        let handle = processor(queue.clone(), Arc::new(repo.clone()), publisher)
            .spawn(shutdown.clone());

        assert_eq!(wait_for_terminal(&repo, &bad_id).await.status(), DocumentStatus::Failed);
        assert_eq!(wait_for_terminal(&repo, &good_id).await.status(), DocumentStatus::Sent);

        let calls = calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 2);
        assert!(calls[1] - calls[0] >= Duration::from_secs(5));

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts_failure_pause() {
        let bad = named_document("bad.pdf");
        let bad_id = bad.id().clone();
        let repo = InMemoryDocumentRepository::with_documents(vec![bad]);
        let queue = Arc::new(UploadQueue::bounded(4));
        let shutdown = CancellationToken::new();
        queue.enqueue(bad_id.clone(), &shutdown).await.unwrap();

        let config = UploadProcessorConfig {
            failure_pause: Duration::from_secs(3600),
        };
        let handle = UploadProcessor::new(
            queue,
            Arc::new(repo.clone()),
            Arc::new(selective_publisher()),
            config,
        )
        .spawn(shutdown.clone());

        wait_for_terminal(&repo, &bad_id).await;
        let start = Instant::now();
        shutdown.cancel();
        handle.await.unwrap();

        assert!(start.elapsed() < Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn test_shutdown_while_idle() {
        let mut publisher = MockDocumentPublisher::new();
        publisher.expect_publish().never();
        let shutdown = CancellationToken::new();

        let handle = processor(
            Arc::new(UploadQueue::bounded(4)),
            Arc::new(InMemoryDocumentRepository::new()),
            publisher,
        )
        .spawn(shutdown.clone());

        shutdown.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("processor should stop promptly")
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_document_finishes_before_shutdown() {
        let doc = received_document(b"slow");
        let id = doc.id().clone();
        let repo = InMemoryDocumentRepository::with_documents(vec![doc]);
        let queue = Arc::new(UploadQueue::bounded(4));
        let shutdown = CancellationToken::new();
        queue.enqueue(id.clone(), &shutdown).await.unwrap();

        let publisher = crate::infrastructure::publisher::InMemoryDocumentPublisher::default();
        let handle = processor(queue, Arc::new(repo.clone()), publisher).spawn(shutdown.clone());

        // let the processor pick the document up and start the 2s publish
        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown.cancel();
        handle.await.unwrap();

        let stored = repo.get(&id).await.unwrap().unwrap();
        assert_eq!(stored.status(), DocumentStatus::Sent);
    }
}
