//! Error types for luthier.

use thiserror::Error;

/// Result type alias using luthier's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for luthier operations.
///
/// Variants are grouped by who is at fault: the operator (`Config`), the
/// caller (`InvalidInput`, `MethodNotAllowed`), the inference service
/// (`Inference`, `UnparseableOutput`) or the service itself (everything else).
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Missing credentials or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP method not supported by the endpoint
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// The inference service failed or could not be reached
    #[error("Inference error: {0}")]
    Inference(String),

    /// The inference service replied, but no JSON object could be recovered
    #[error("Unparseable model output: {0}")]
    UnparseableOutput(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// HTTP/network request failed (non-inference traffic, e.g. image fetches)
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when the failure originated at the inference service rather than
    /// in the caller's request or in this service.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Error::Inference(_))
    }

    /// True when the model answered but its reply could not be coerced into JSON.
    pub fn is_unparseable(&self) -> bool {
        matches!(self, Error::UnparseableOutput(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
