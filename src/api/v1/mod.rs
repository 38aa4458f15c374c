//! Versioned document API

pub mod documents;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use super::state::AppState;

/// Base64 inflates payloads by a third; leave room for that and the form overhead
const MAX_REQUEST_BODY: usize = documents::MAX_FILE_SIZE * 3 / 2;

/// Create v1 API router
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route(
            "/documents",
            post(documents::upload_document).get(documents::search_documents),
        )
        .route("/documents/upload-file", post(documents::upload_document_file))
        .route("/documents/{document_id}", get(documents::get_document))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY))
}
