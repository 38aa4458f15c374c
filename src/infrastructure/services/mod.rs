//! Infrastructure services

mod document_service;

pub use document_service::{
    decode_payload, DocumentService, DocumentServiceTrait, UploadDocumentRequest,
};
