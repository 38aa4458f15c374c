//! Ingestion queue

mod upload_queue;

pub use upload_queue::{QueueError, UploadQueue, DEFAULT_QUEUE_CAPACITY};
