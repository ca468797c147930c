//! Anthropic-specific error handling.

use luthier_core::Error;

/// Anthropic-specific error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnthropicErrorCode {
    /// Invalid or missing API key.
    AuthenticationError,
    /// Model not found or not available to this key.
    ModelNotFound,
    /// Rate limit exceeded.
    RateLimitExceeded,
    /// The service is temporarily overloaded (HTTP 529).
    Overloaded,
    /// Server error.
    ServerError,
    /// Malformed request (bad image, too many tokens, ...).
    InvalidRequest,
    /// Unknown error.
    Unknown,
}

impl AnthropicErrorCode {
    /// Determine error code from HTTP status and error type.
    pub fn from_response(status: u16, error_type: &str) -> Self {
        match (status, error_type) {
            (401, _) | (_, "authentication_error") => Self::AuthenticationError,
            (404, _) | (_, "not_found_error") => Self::ModelNotFound,
            (429, _) | (_, "rate_limit_error") => Self::RateLimitExceeded,
            (529, _) | (_, "overloaded_error") => Self::Overloaded,
            (500..=599, _) | (_, "api_error") => Self::ServerError,
            (400, _) | (_, "invalid_request_error") => Self::InvalidRequest,
            _ => Self::Unknown,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimitExceeded | Self::Overloaded | Self::ServerError
        )
    }
}

/// Convert an Anthropic error to a luthier Error.
pub fn to_luthier_error(code: AnthropicErrorCode, message: &str) -> Error {
    match code {
        AnthropicErrorCode::AuthenticationError => {
            Error::Config(format!("Authentication failed: {}", message))
        }
        AnthropicErrorCode::ModelNotFound => Error::Config(format!("Model not found: {}", message)),
        AnthropicErrorCode::RateLimitExceeded => {
            Error::Inference(format!("Rate limit exceeded: {}", message))
        }
        AnthropicErrorCode::Overloaded => Error::Inference(format!("Overloaded: {}", message)),
        AnthropicErrorCode::ServerError => Error::Inference(format!("Server error: {}", message)),
        AnthropicErrorCode::InvalidRequest => {
            Error::Inference(format!("Invalid request: {}", message))
        }
        AnthropicErrorCode::Unknown => Error::Inference(message.to_string()),
    }
}
