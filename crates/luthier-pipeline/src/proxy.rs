//! Verbatim prompt passthrough for callers that build their own prompts.

use serde_json::{json, Value};
use tracing::debug;

use luthier_core::defaults::PROXY_MAX_TOKENS;
use luthier_core::{extract_json_object, CompletionRequest, InferenceBackend, Result};

/// Forward `system` and `user_message` unchanged.
///
/// Returns the recovered JSON object, or `{"result": "<raw reply>"}` when the
/// reply holds none. Upstream failures propagate.
pub async fn forward(
    backend: &dyn InferenceBackend,
    model: &str,
    system: &str,
    user_message: &str,
) -> Result<Value> {
    let request = CompletionRequest::new(user_message, PROXY_MAX_TOKENS)
        .with_system(system)
        .with_model(model);
    let reply = backend.complete(request).await?;

    match extract_json_object(&reply) {
        Ok((value, strategy)) => {
            debug!(
                subsystem = "pipeline",
                component = "proxy",
                strategy = strategy.as_str(),
                "Proxy reply parsed"
            );
            Ok(value)
        }
        Err(_) => {
            debug!(
                subsystem = "pipeline",
                component = "proxy",
                response_len = reply.len(),
                "Proxy reply is not JSON, returning raw text"
            );
            Ok(json!({ "result": reply }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luthier_core::defaults::TEXT_MODEL;
    use luthier_inference::mock::MockInferenceBackend;

    #[tokio::test]
    async fn test_json_reply_returned_as_object() {
        let backend = MockInferenceBackend::new().with_fixed_response("Sure! {\"title\": \"Les Paul\"}");
        let value = forward(&backend, TEXT_MODEL, "Be terse", "Name a guitar").await.unwrap();
        assert_eq!(value, json!({"title": "Les Paul"}));

        let call = &backend.get_calls()[0];
        assert_eq!(call.system.as_deref(), Some("Be terse"));
        assert_eq!(call.prompt, "Name a guitar");
        assert_eq!(call.max_tokens, PROXY_MAX_TOKENS);
        assert_eq!(call.model.as_deref(), Some(TEXT_MODEL));
    }

    #[tokio::test]
    async fn test_plain_reply_wrapped() {
        let backend = MockInferenceBackend::new().with_fixed_response("A Telecaster.");
        let value = forward(&backend, TEXT_MODEL, "s", "u").await.unwrap();
        assert_eq!(value, json!({"result": "A Telecaster."}));
    }

    #[tokio::test]
    async fn test_upstream_failure_propagates() {
        let backend = MockInferenceBackend::new().with_default_failure("rate limited");
        let err = forward(&backend, TEXT_MODEL, "s", "u").await.unwrap_err();
        assert!(err.is_upstream());
    }
}
