//! Infrastructure layer - External service implementations

pub mod document;
pub mod logging;
pub mod observability;
pub mod publisher;
pub mod queue;
pub mod services;
pub mod worker;
