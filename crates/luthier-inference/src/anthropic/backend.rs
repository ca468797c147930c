//! Anthropic Messages API backend implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, trace, warn};

use luthier_core::defaults::{
    ANTHROPIC_URL, ANTHROPIC_VERSION, ENV_ANTHROPIC_API_KEY, INFERENCE_TIMEOUT_SECS, TEXT_MODEL,
};
use luthier_core::{CompletionRequest, Error, InferenceBackend, Result};

use super::error::{to_luthier_error, AnthropicErrorCode};
use super::types::*;

/// Configuration for the Anthropic backend.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// Base URL for the API endpoint (without `/messages`).
    pub base_url: String,
    /// API key sent as `x-api-key`.
    pub api_key: Option<String>,
    /// Value of the `anthropic-version` header.
    pub api_version: String,
    /// Model used when a request does not name one.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            base_url: ANTHROPIC_URL.to_string(),
            api_key: None,
            api_version: ANTHROPIC_VERSION.to_string(),
            model: TEXT_MODEL.to_string(),
            timeout_seconds: INFERENCE_TIMEOUT_SECS,
        }
    }
}

impl AnthropicConfig {
    /// Read configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("ANTHROPIC_BASE_URL")
                .unwrap_or_else(|_| ANTHROPIC_URL.to_string()),
            api_key: std::env::var(ENV_ANTHROPIC_API_KEY)
                .ok()
                .filter(|k| !k.trim().is_empty()),
            api_version: std::env::var("ANTHROPIC_VERSION")
                .unwrap_or_else(|_| ANTHROPIC_VERSION.to_string()),
            model: std::env::var("ANTHROPIC_TEXT_MODEL")
                .unwrap_or_else(|_| TEXT_MODEL.to_string()),
            timeout_seconds: std::env::var("ANTHROPIC_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(INFERENCE_TIMEOUT_SECS),
        }
    }
}

/// Anthropic Messages API backend.
pub struct AnthropicBackend {
    client: Client,
    config: AnthropicConfig,
    api_key: String,
}

impl AnthropicBackend {
    /// Create a new backend. Fails with [`Error::Config`] when no API key is set.
    pub fn new(config: AnthropicConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Config(format!("{} not configured", ENV_ANTHROPIC_API_KEY)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Inference(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            component = "anthropic",
            "Initializing Anthropic backend: url={}, model={}, timeout={}s",
            config.base_url,
            config.model,
            config.timeout_seconds
        );

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(AnthropicConfig::from_env())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &AnthropicConfig {
        &self.config
    }

    /// Build an authenticated request to the messages endpoint.
    fn build_request(&self) -> reqwest::RequestBuilder {
        let url = format!("{}/messages", self.config.base_url.trim_end_matches('/'));
        self.client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.config.api_version)
            .header("content-type", "application/json")
    }
}

#[async_trait]
impl InferenceBackend for AnthropicBackend {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.config.model.clone());
        let start = Instant::now();

        debug!(
            subsystem = "inference",
            component = "anthropic",
            op = "complete",
            model = %model,
            prompt_len = request.prompt.len(),
            image_count = request.images.len(),
            max_tokens = request.max_tokens,
            "Sending completion request"
        );

        let body = MessagesRequest {
            model: model.clone(),
            max_tokens: request.max_tokens,
            system: request.system.filter(|s| !s.is_empty()),
            messages: vec![Message::user(&request.images, &request.prompt)],
        };

        let response = self
            .build_request()
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Inference(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let (error_type, message) = match serde_json::from_str::<AnthropicErrorResponse>(&text)
            {
                Ok(body) => (body.error.error_type, body.error.message),
                Err(_) => (String::new(), text.clone()),
            };
            let code = AnthropicErrorCode::from_response(status.as_u16(), &error_type);
            warn!(
                subsystem = "inference",
                component = "anthropic",
                status = status.as_u16(),
                retryable = code.is_retryable(),
                error = %message,
                "Anthropic returned an error status"
            );
            return Err(to_luthier_error(
                code,
                &format!("Anthropic returned {}: {}", status, message),
            ));
        }

        let result: MessagesResponse = serde_json::from_str(&text)
            .map_err(|e| Error::Inference(format!("Failed to parse response: {}", e)))?;

        if let Some(err) = result.error.as_ref() {
            let code = AnthropicErrorCode::from_response(status.as_u16(), &err.error_type);
            return Err(to_luthier_error(code, &err.message));
        }

        let content = result
            .first_text()
            .map(str::to_string)
            .ok_or_else(|| Error::Inference("No text in inference response".to_string()))?;

        debug!(
            subsystem = "inference",
            component = "anthropic",
            op = "complete",
            model = %model,
            response_len = content.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            stop_reason = result.stop_reason.as_deref().unwrap_or(""),
            "Completion finished"
        );
        trace!(reply = %content, "Raw model reply");

        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
