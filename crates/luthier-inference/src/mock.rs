//! Mock inference backend for deterministic testing.
//!
//! Replies are scripted by substring: the first rule whose needle appears in
//! the prompt or system prompt answers the call. Unmatched calls get the
//! default reply.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use luthier_inference::mock::MockInferenceBackend;
//! use luthier_core::{CompletionRequest, InferenceBackend};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = MockInferenceBackend::new()
//!         .with_response_mapping("headstock", r#"{"brand_read": "Suhr"}"#)
//!         .with_failure_mapping("Model: Broken", "simulated outage");
//!
//!     let reply = backend
//!         .complete(CompletionRequest::new("Read the headstock", 256))
//!         .await
//!         .unwrap();
//!     assert!(reply.contains("Suhr"));
//!     assert_eq!(backend.call_count(), 1);
//! }
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use luthier_core::{CompletionRequest, Error, InferenceBackend, Result};

/// Mock inference backend for testing.
#[derive(Clone)]
pub struct MockInferenceBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Upstream(String),
    Config(String),
}

#[derive(Debug, Clone)]
struct MockRule {
    needle: String,
    reply: MockReply,
}

#[derive(Debug, Clone)]
struct MockConfig {
    model: String,
    rules: Vec<MockRule>,
    default_reply: MockReply,
    latency_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            model: "mock-model".to_string(),
            rules: Vec::new(),
            default_reply: MockReply::Text("Mock response".to_string()),
            latency_ms: 0,
        }
    }
}

/// One recorded call.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub system: Option<String>,
    pub prompt: String,
    pub image_count: usize,
    pub max_tokens: u32,
    pub model: Option<String>,
}

impl MockInferenceBackend {
    /// Create a new mock backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the reply for calls no rule matches.
    pub fn with_fixed_response(mut self, response: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).default_reply = MockReply::Text(response.into());
        self
    }

    /// Make unmatched calls fail as an upstream error.
    pub fn with_default_failure(mut self, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).default_reply = MockReply::Upstream(message.into());
        self
    }

    /// Reply with `output` when `needle` occurs in the prompt or system prompt.
    pub fn with_response_mapping(
        mut self,
        needle: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.config).rules.push(MockRule {
            needle: needle.into(),
            reply: MockReply::Text(output.into()),
        });
        self
    }

    /// Fail with [`Error::Inference`] when `needle` occurs.
    pub fn with_failure_mapping(
        mut self,
        needle: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.config).rules.push(MockRule {
            needle: needle.into(),
            reply: MockReply::Upstream(message.into()),
        });
        self
    }

    /// Fail with [`Error::Config`] when `needle` occurs.
    pub fn with_config_failure_mapping(
        mut self,
        needle: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.config).rules.push(MockRule {
            needle: needle.into(),
            reply: MockReply::Config(message.into()),
        });
        self
    }

    /// Set simulated latency for all calls.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        Arc::make_mut(&mut self.config).latency_ms = latency_ms;
        self
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.log().iter().cloned().collect()
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.log().len()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.log().clear()
    }

    fn log(&self) -> std::sync::MutexGuard<'_, Vec<MockCall>> {
        self.call_log.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn reply_for(&self, request: &CompletionRequest) -> MockReply {
        let system = request.system.as_deref().unwrap_or("");
        self.config
            .rules
            .iter()
            .find(|rule| request.prompt.contains(&rule.needle) || system.contains(&rule.needle))
            .map(|rule| rule.reply.clone())
            .unwrap_or_else(|| self.config.default_reply.clone())
    }
}

impl Default for MockInferenceBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceBackend for MockInferenceBackend {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        self.log().push(MockCall {
            system: request.system.clone(),
            prompt: request.prompt.clone(),
            image_count: request.images.len(),
            max_tokens: request.max_tokens,
            model: request.model.clone(),
        });

        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }

        match self.reply_for(&request) {
            MockReply::Text(text) => Ok(text),
            MockReply::Upstream(message) => Err(Error::Inference(message)),
            MockReply::Config(message) => Err(Error::Config(message)),
        }
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
