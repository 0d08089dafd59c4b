//! Custom error types for policy-sync
//!
//! This module defines the error hierarchy for backup and restore runs using
//! thiserror for ergonomic error definitions.

use thiserror::Error;

/// The main error type for policy-sync operations
#[derive(Error, Debug)]
pub enum PolicyError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// A stored or fetched document is not a usable policy document
    #[error("Invalid policy document {source_name}: {reason}")]
    InvalidDocument { source_name: String, reason: String },

    /// No object on the target matches a link reference
    #[error("Link not found. link_type: {link_type}, link_name: {link_name}")]
    ReferenceNotFound { link_type: String, link_name: String },

    /// More than one object on the target matches a link reference
    #[error("Ambiguous link: {count} matches for link_type: {link_type}, link_name: {link_name}")]
    AmbiguousReference {
        link_type: String,
        link_name: String,
        count: usize,
    },

    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The Policy Service answered with an unexpected status
    #[error("Server error ({status}) for {path}: {body}")]
    Server {
        status: u16,
        path: String,
        body: String,
    },

    /// The Policy Service answered with a body that is not what the API promises
    #[error("Unexpected response for {path}: {reason}")]
    Response { path: String, reason: String },

    /// Fetching a remote restore source failed
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// Version-control synchronization errors
    #[error("Git error: {0}")]
    Git(String),
}

impl PolicyError {
    /// Create a "reference not found" error
    pub fn reference_not_found(link_type: impl Into<String>, link_name: impl Into<String>) -> Self {
        Self::ReferenceNotFound {
            link_type: link_type.into(),
            link_name: link_name.into(),
        }
    }

    /// Create an "invalid document" error
    pub fn invalid_document(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDocument {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a server error from a response status and body
    pub fn server(status: u16, path: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Server {
            status,
            path: path.into(),
            body: body.into(),
        }
    }

    /// Create an "unexpected response" error
    pub fn response(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Response {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error only invalidates the document being restored
    ///
    /// Document-scoped errors are recorded against the document and the run
    /// continues unless fail-fast is requested. Everything else aborts the run.
    pub fn is_document_scoped(&self) -> bool {
        matches!(
            self,
            Self::ReferenceNotFound { .. }
                | Self::AmbiguousReference { .. }
                | Self::InvalidDocument { .. }
                | Self::Fetch { .. }
                | Self::Json(_)
                | Self::Io(_)
        )
    }

    /// Check if this is a reference resolution error
    pub fn is_reference_error(&self) -> bool {
        matches!(
            self,
            Self::ReferenceNotFound { .. } | Self::AmbiguousReference { .. }
        )
    }
}

impl From<std::io::Error> for PolicyError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PolicyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<reqwest::Error> for PolicyError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Result type alias for policy-sync operations
pub type PolicyResult<T> = Result<T, PolicyError>;
