//! Index administration error types.
//!
//! This module defines the error types that can occur while managing an index
//! on the search service.

use thiserror::Error;

/// Errors that can occur during index administration.
#[derive(Debug, Clone, Error)]
pub enum IndexAdminError {
    /// Invalid input (e.g., empty index name).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Failed to reach the search service, or the transport failed mid-request.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The index does not exist.
    #[error("Index not found: {0}")]
    IndexNotFound(String),

    /// The index already exists and cannot be created again.
    #[error("Index already exists: {0}")]
    IndexAlreadyExists(String),

    /// Create-index request was rejected.
    #[error("Index creation error: {0}")]
    CreateFailed(String),

    /// Delete-index request was rejected.
    #[error("Index deletion error: {0}")]
    DeleteFailed(String),

    /// Put-mapping request was rejected.
    #[error("Mapping error: {0}")]
    MappingFailed(String),

    /// The service answered with a body we could not interpret.
    #[error("Response parse error: {0}")]
    ResponseParseError(String),

    /// Any other non-success response.
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl IndexAdminError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an index not found error.
    pub fn index_not_found(index: &str) -> Self {
        Self::IndexNotFound(index.to_string())
    }

    /// Create an index already exists error.
    pub fn index_already_exists(index: &str) -> Self {
        Self::IndexAlreadyExists(index.to_string())
    }

    /// Create an index creation error.
    pub fn create(msg: impl Into<String>) -> Self {
        Self::CreateFailed(msg.into())
    }

    /// Create an index deletion error.
    pub fn delete(msg: impl Into<String>) -> Self {
        Self::DeleteFailed(msg.into())
    }

    /// Create a mapping error.
    pub fn mapping(msg: impl Into<String>) -> Self {
        Self::MappingFailed(msg.into())
    }

    /// Create a response parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ResponseParseError(msg.into())
    }

    /// Create an unknown error.
    pub fn unknown(msg: impl Into<String>) -> Self {
        Self::Unknown(msg.into())
    }

    /// Whether the failure happened before the service produced a response.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::ConnectionError(_))
    }
}
