//! Error types for webset-tools
//!
//! This module provides comprehensive error handling for the library, including:
//! - Domain-specific error types (Client, Database, Research, etc.)
//! - Remote response context (status code and body) on API failures
//! - The distinction between fatal, tick-local and timeout failures that the
//!   webset populator relies on

use crate::types::DocumentId;
use thiserror::Error;

/// Result type alias for webset-tools operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for webset-tools
///
/// This is the primary error type used throughout the library. Each variant includes
/// contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "api_key")
        key: Option<String>,
    },

    /// Search request failed validation before any remote call was made
    #[error("invalid search request: {0}")]
    Validation(String),

    /// Webset API call failed
    #[error("webset client error: {0}")]
    Client(#[from] ClientError),

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// Polling exceeded its attempt budget without the webset reaching the
    /// terminal status. The partial sheet has already been persisted under
    /// `document_id`.
    #[error("webset polling timed out after {attempts} attempts (document {document_id})")]
    PollTimeout {
        /// Document id of the partial sheet that was persisted
        document_id: DocumentId,
        /// Number of poll attempts made before giving up
        attempts: u32,
    },

    /// Populate invocation was cancelled. The partial sheet has already been
    /// persisted under `document_id`.
    #[error("webset population cancelled (document {document_id})")]
    Cancelled {
        /// Document id of the partial sheet that was persisted
        document_id: DocumentId,
    },

    /// Web search call returned a non-success response
    #[error("search failed with HTTP {status}: {body}")]
    Search {
        /// HTTP status code returned by the remote service
        status: u16,
        /// Response body text
        body: String,
    },

    /// Research task error
    #[error("research error: {0}")]
    Research(#[from] ResearchError),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Document not found
    #[error("document not found: {0}")]
    NotFound(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Webset API errors
///
/// Every variant that originates from a non-success HTTP response carries the
/// remote status code and response body. During polling, `StatusFetch` and
/// `ItemsFetch` are tick-local: the loop logs them and continues. Only
/// `TaskCreation` aborts an invocation.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Webset creation returned a non-success response (fatal, no retry)
    #[error("webset creation failed with HTTP {status}: {body}")]
    TaskCreation {
        /// HTTP status code returned by the remote service
        status: u16,
        /// Response body text
        body: String,
    },

    /// Status fetch returned a non-success response (tick-local)
    #[error("status fetch failed with HTTP {status}: {body}")]
    StatusFetch {
        /// HTTP status code returned by the remote service
        status: u16,
        /// Response body text
        body: String,
    },

    /// Item listing returned a non-success response (tick-local)
    #[error("item listing failed with HTTP {status}: {body}")]
    ItemsFetch {
        /// HTTP status code returned by the remote service
        status: u16,
        /// Response body text
        body: String,
    },

    /// Single-item detail fetch returned a non-success response
    #[error("item fetch failed with HTTP {status}: {body}")]
    ItemFetch {
        /// HTTP status code returned by the remote service
        status: u16,
        /// Response body text
        body: String,
    },

    /// Endpoint URL construction failed
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),

    /// Transport-level failure (connect, timeout, malformed response body)
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Record not found
    #[error("record not found: {0}")]
    NotFound(String),
}

/// Research task errors
#[derive(Debug, Error)]
pub enum ResearchError {
    /// Research task creation returned a non-success response
    #[error("research task creation failed with HTTP {status}: {body}")]
    TaskCreation {
        /// HTTP status code returned by the remote service
        status: u16,
        /// Response body text
        body: String,
    },

    /// Research status fetch returned a non-success response
    #[error("research status fetch failed with HTTP {status}: {body}")]
    StatusFetch {
        /// HTTP status code returned by the remote service
        status: u16,
        /// Response body text
        body: String,
    },

    /// The remote service reported the task as failed
    #[error("research task failed: {0}")]
    Failed(String),

    /// Polling exceeded the attempt budget without a terminal status
    #[error("research task timed out after {attempts} attempts")]
    TimedOut {
        /// Number of poll attempts made before giving up
        attempts: u32,
    },

    /// Transport-level failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_creation_error_carries_remote_context() {
        let err = Error::Client(ClientError::TaskCreation {
            status: 422,
            body: "missing entity type".to_string(),
        });
        let msg = err.to_string();
        assert!(msg.contains("422"));
        assert!(msg.contains("missing entity type"));
    }

    #[test]
    fn poll_timeout_names_the_document() {
        let err = Error::PollTimeout {
            document_id: DocumentId::from("doc-1".to_string()),
            attempts: 150,
        };
        assert!(err.to_string().contains("doc-1"));
        assert!(err.to_string().contains("150"));
    }
}
