//! Background workers

mod upload_processor;

pub use upload_processor::{ProcessOutcome, UploadProcessor, UploadProcessorConfig};
