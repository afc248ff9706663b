use thiserror::Error;

use crate::storage::StorageError;
use tenderflow_llm::error::GatewayError;

/// Error types for pipeline stage operations
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Referenced project or media does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed or missing required input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Input string does not parse as a URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Remote document retrieval did not succeed
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// Document-conversion service rejected the payload
    #[error("Conversion failed: {0}")]
    Conversion(String),

    /// Text-extraction service rejected the payload
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// Transport-level HTTP failure
    #[error("HTTP error: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    /// Model gateway failure, propagated unchanged so the original cause
    /// stays visible to the caller
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Persistence collaborator failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// JSON serialization failure while building a prompt
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

impl PipelineError {
    /// Create a not-found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput(message.into())
    }
}
