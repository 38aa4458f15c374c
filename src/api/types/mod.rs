//! HTTP request, response and error types

pub mod document;
pub mod error;
pub mod json;

pub use document::{DocumentPageResponse, DocumentResponse, DocumentSearchParams, UploadAccepted};
pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use json::Json;
