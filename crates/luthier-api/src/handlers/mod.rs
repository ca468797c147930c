//! HTTP handlers for the pipeline routes.
//!
//! Bodies are taken as raw bytes and parsed here, so a malformed body is a
//! 400 with the usual `{"error"}` shape instead of axum's rejection text, and
//! the credential check can run before the body is looked at.

pub mod analyze;
pub mod extract;

use axum::body::Bytes;
use serde_json::Value;

use crate::ApiError;

/// Parse a request body as a JSON object.
pub(crate) fn parse_json_body(body: &Bytes) -> Result<Value, ApiError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => Err(ApiError::BadRequest(
            "Request body must be a JSON object".to_string(),
        )),
        Err(e) => Err(ApiError::BadRequest(format!("Invalid JSON body: {}", e))),
    }
}

/// A non-empty array of strings at `key`; anything else is empty.
pub(crate) fn string_array(body: &Value, key: &str) -> Vec<String> {
    body.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// A non-blank string at `key`.
pub(crate) fn non_empty_str<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}
