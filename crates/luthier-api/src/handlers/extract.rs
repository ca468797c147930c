//! `POST /api/v1/extract-content`

use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use luthier_core::{Error, InstrumentIdentity};
use luthier_pipeline::{compose_source, proxy, BatchOutcome, ContentPipeline, Phase};

use super::{non_empty_str, parse_json_body};
use crate::{ApiError, AppState};

/// Body of a `full` or `enrich` response.
#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

/// Extract instrument records from text, or pass a prompt straight through.
///
/// # Request Body
/// - `system` + `user_message`: proxy mode, both non-empty; everything else
///   is ignored
/// - `phase`: `full`, `identify` or `enrich` (required otherwise)
/// - `textContent` / `url`: source text, one required for `full` and `identify`
/// - `guitars`: identities to enrich, required for `enrich`
///
/// # Returns
/// - 200 OK with the identify result, the batch outcome, or the proxy reply
/// - 400 Bad Request for a bad body, phase or missing input
/// - 500 if the inference credential is missing or identify was unparseable
/// - 502 if the inference service failed
pub async fn extract_content(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let backend = state.require_inference()?;
    let body = parse_json_body(&body)?;

    if let (Some(system), Some(user_message)) = (
        non_empty_str(&body, "system"),
        non_empty_str(&body, "user_message"),
    ) {
        info!(subsystem = "api", component = "extract", phase = "proxy", "Proxy request received");
        let reply =
            proxy::forward(backend.as_ref(), &state.content_config.text_model, system, user_message)
                .await?;
        return Ok(Json(reply).into_response());
    }

    let phase = body
        .get("phase")
        .and_then(Value::as_str)
        .and_then(Phase::parse)
        .ok_or_else(|| {
            Error::InvalidInput("Invalid phase. Must be 'full', 'identify', or 'enrich'".to_string())
        })?;

    let source = compose_source(
        body.get("textContent").and_then(Value::as_str),
        body.get("url").and_then(Value::as_str),
    );

    info!(
        subsystem = "api",
        component = "extract",
        phase = phase.as_str(),
        has_source = source.is_some(),
        "Extract request received"
    );

    let pipeline = ContentPipeline::new(backend, state.sink.clone(), state.content_config.clone());

    match phase {
        Phase::Identify | Phase::Full => {
            let source = source.ok_or_else(|| {
                Error::InvalidInput("Either textContent or url must be provided".to_string())
            })?;
            if phase == Phase::Identify {
                let identified = pipeline.identify(&source).await?;
                return Ok(Json(identified).into_response());
            }
            let outcome = pipeline.run_full(&source).await?;
            Ok(batch_response(outcome))
        }
        Phase::Enrich => {
            let identities = parse_identities(&body)?;
            let source = source.unwrap_or_default();
            let outcome = pipeline.enrich_and_persist(&identities, &source).await;
            Ok(batch_response(outcome))
        }
    }
}

fn parse_identities(body: &Value) -> Result<Vec<InstrumentIdentity>, ApiError> {
    let missing = || Error::InvalidInput("guitars array required for enrich phase".to_string());

    let items = match body.get("guitars") {
        Some(Value::Array(items)) if !items.is_empty() => items.clone(),
        _ => return Err(missing().into()),
    };
    let identities: Vec<InstrumentIdentity> = serde_json::from_value(Value::Array(items))
        .map_err(|e| Error::InvalidInput(format!("Invalid guitars array: {}", e)))?;
    Ok(identities)
}

fn batch_response(outcome: BatchOutcome) -> Response {
    Json(ExtractResponse {
        success: true,
        outcome,
    })
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_identities_requires_non_empty_array() {
        assert!(parse_identities(&json!({})).is_err());
        assert!(parse_identities(&json!({"guitars": []})).is_err());
        assert!(parse_identities(&json!({"guitars": "Fender"})).is_err());
    }

    #[test]
    fn test_parse_identities_is_lenient_on_fields() {
        let identities = parse_identities(&json!({
            "guitars": [{"brand": "Fender", "model": "Jazzmaster", "year": "1959"}]
        }))
        .unwrap();
        assert_eq!(identities[0].year, Some(1959));
    }

    #[test]
    fn test_batch_response_shape() {
        let outcome = BatchOutcome::default();
        let body = serde_json::to_value(ExtractResponse {
            success: true,
            outcome,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({"success": true, "guitars": [], "inserted": 0, "failed": []})
        );
    }
}
