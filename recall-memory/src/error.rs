//! Error types for recall-memory

use thiserror::Error;

/// Result type alias for recall-memory operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in recall-memory
#[derive(Error, Debug)]
pub enum Error {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Index out of range: {index} (entries: {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Embedding service error: {0}")]
    EmbeddingService(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote memory service returned {status}: {body}")]
    Remote { status: u16, body: String },
}

impl Error {
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::EmbeddingService(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
