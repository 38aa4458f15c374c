//! Document domain entities

use std::fmt;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::DocumentError;

/// Regex pattern for valid document IDs: doc-{uuid}
static ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^doc-[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}$").unwrap()
});

/// Maximum length for document IDs
pub const MAX_ID_LENGTH: usize = 40; // "doc-" + 36 char UUID

/// Validated document identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(String);

impl DocumentId {
    /// Create a new validated document ID
    pub fn new(id: impl Into<String>) -> Result<Self, DocumentError> {
        let id = id.into();
        validate_document_id(&id)?;
        Ok(Self(id))
    }

    /// Generate a fresh document ID. IDs are never reused.
    pub fn generate() -> Self {
        Self(format!("doc-{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DocumentId {
    type Error = DocumentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> Self {
        id.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validate a document ID string
pub fn validate_document_id(id: &str) -> Result<(), DocumentError> {
    if id.is_empty() {
        return Err(DocumentError::invalid_id("Document ID cannot be empty"));
    }

    if id.len() > MAX_ID_LENGTH {
        return Err(DocumentError::invalid_id(format!(
            "Document ID exceeds maximum length of {} characters",
            MAX_ID_LENGTH
        )));
    }

    if !ID_PATTERN.is_match(id) {
        return Err(DocumentError::invalid_id(format!(
            "Invalid document ID '{}': must be in format doc-{{uuid}}",
            id
        )));
    }

    Ok(())
}

/// Lifecycle status of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Persisted by intake and waiting for the worker
    #[default]
    Received,

    /// Published; the location reference is set and the payload is gone
    Sent,

    /// The single publish attempt failed
    Failed,
}

impl DocumentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Sent | Self::Failed)
    }

    pub fn can_transition_to(&self, target: DocumentStatus) -> bool {
        matches!(
            (self, target),
            (Self::Received, Self::Sent) | (Self::Received, Self::Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Business classification of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Kyc,
    Contract,
    Form,
    SupportingDocument,
    Other,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kyc => "kyc",
            Self::Contract => "contract",
            Self::Form => "form",
            Self::SupportingDocument => "supporting_document",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Channel the document was submitted through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Branch,
    Digital,
    Backoffice,
    Other,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Branch => write!(f, "branch"),
            Self::Digital => write!(f, "digital"),
            Self::Backoffice => write!(f, "backoffice"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Fields captured once by intake for a new document
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub filename: String,
    pub content_type: String,
    pub document_type: DocumentType,
    pub channel: Channel,
    pub customer_id: Option<String>,
    pub correlation_id: String,
    pub payload: Vec<u8>,
}

/// A submitted document and its publishing state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    id: DocumentId,
    filename: String,
    content_type: String,
    document_type: DocumentType,
    channel: Channel,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_id: Option<String>,
    correlation_id: String,
    status: DocumentStatus,

    /// Storage location, only present once sent
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,

    size: u64,

    /// Raw content, dropped after a successful publish
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<Vec<u8>>,

    uploaded_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    processed_at: Option<DateTime<Utc>>,
}

impl Document {
    /// Create a new document in the `Received` state with a fresh ID
    pub fn received(new: NewDocument) -> Self {
        Self::with_id(DocumentId::generate(), new)
    }

    /// Create a `Received` document with a specific ID
    pub fn with_id(id: DocumentId, new: NewDocument) -> Self {
        Self {
            id,
            filename: new.filename,
            content_type: new.content_type,
            document_type: new.document_type,
            channel: new.channel,
            customer_id: new.customer_id,
            correlation_id: new.correlation_id,
            status: DocumentStatus::Received,
            location: None,
            size: new.payload.len() as u64,
            payload: Some(new.payload),
            uploaded_at: Utc::now(),
            processed_at: None,
        }
    }

    /// Override the upload timestamp
    pub fn with_uploaded_at(mut self, uploaded_at: DateTime<Utc>) -> Self {
        self.uploaded_at = uploaded_at;
        self
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn customer_id(&self) -> Option<&str> {
        self.customer_id.as_deref()
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn status(&self) -> DocumentStatus {
        self.status
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    pub fn uploaded_at(&self) -> DateTime<Utc> {
        self.uploaded_at
    }

    pub fn processed_at(&self) -> Option<DateTime<Utc>> {
        self.processed_at
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Record a successful publish: sets the location and drops the payload
    pub fn mark_sent(&mut self, location: impl Into<String>) -> Result<(), DocumentError> {
        let location = location.into();

        if !self.status.can_transition_to(DocumentStatus::Sent) {
            return Err(DocumentError::invalid_transition(
                self.status.as_str(),
                "sent",
                "Document is not in received state",
            ));
        }

        if location.trim().is_empty() {
            return Err(DocumentError::validation("Location reference cannot be empty"));
        }

        self.status = DocumentStatus::Sent;
        self.location = Some(location);
        self.payload = None;
        self.processed_at = Some(Utc::now());
        Ok(())
    }

    /// Record a failed publish attempt
    pub fn mark_failed(&mut self) -> Result<(), DocumentError> {
        if !self.status.can_transition_to(DocumentStatus::Failed) {
            return Err(DocumentError::invalid_transition(
                self.status.as_str(),
                "failed",
                "Document is not in received state",
            ));
        }

        self.status = DocumentStatus::Failed;
        self.processed_at = Some(Utc::now());
        Ok(())
    }
}
