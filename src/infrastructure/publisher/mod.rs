//! Publisher implementations

mod in_memory;

pub use in_memory::{InMemoryDocumentPublisher, InMemoryPublisherConfig, DEFAULT_BASE_URL};
