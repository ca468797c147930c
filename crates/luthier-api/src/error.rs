//! Mapping pipeline errors onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, warn};

use luthier_core::Error;

/// Error returned by every handler. The body is always `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    /// Missing credentials or bad configuration.
    Config(String),
    BadRequest(String),
    MethodNotAllowed,
    /// The inference service failed.
    Upstream(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Config(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn message(self) -> String {
        match self {
            ApiError::Config(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Upstream(msg)
            | ApiError::Internal(msg) => msg,
            ApiError::MethodNotAllowed => "Method not allowed".to_string(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Config(msg) => ApiError::Config(msg),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::MethodNotAllowed => ApiError::MethodNotAllowed,
            Error::Inference(msg) => ApiError::Upstream(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();

        if status.is_server_error() {
            error!(subsystem = "api", status = status.as_u16(), error = %message, "Request failed");
        } else {
            warn!(subsystem = "api", status = status.as_u16(), error = %message, "Request rejected");
        }

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::Config("no key".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (Error::InvalidInput("bad".into()), StatusCode::BAD_REQUEST),
            (Error::MethodNotAllowed, StatusCode::METHOD_NOT_ALLOWED),
            (Error::Inference("529".into()), StatusCode::BAD_GATEWAY),
            (Error::UnparseableOutput("prose".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (Error::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_client_errors_keep_their_message() {
        let err = ApiError::from(Error::InvalidInput("guitars array required for enrich phase".into()));
        assert_eq!(err.message(), "guitars array required for enrich phase");
    }

    #[test]
    fn test_unparseable_message_names_the_problem() {
        let err = ApiError::from(Error::UnparseableOutput("no JSON object in reply".into()));
        assert!(err.message().contains("Unparseable model output"));
    }
}
