//! Core traits for luthier abstractions.
//!
//! These traits define the seams between the pipelines and their external
//! collaborators, enabling pluggable backends and testability.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::models::PersistableRecord;

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// A base64-encoded image attached to an inference request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageContent {
    /// MIME type, e.g. "image/jpeg".
    pub media_type: String,
    /// Base64 payload (no data-URL prefix).
    pub data: String,
}

/// One round trip to the inference service.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    /// Optional system prompt.
    pub system: Option<String>,
    /// User prompt text, sent after any images.
    pub prompt: String,
    /// Images, in order.
    pub images: Vec<ImageContent>,
    /// Reply token limit.
    pub max_tokens: u32,
    /// Model override; `None` uses the backend's default model.
    pub model: Option<String>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens,
            ..Default::default()
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_images(mut self, images: Vec<ImageContent>) -> Self {
        self.images = images;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Backend that turns a prompt (plus optional images) into raw reply text.
///
/// Upstream failures (non-2xx, error bodies, transport errors) surface as
/// [`crate::Error::Inference`] or [`crate::Error::Config`], never as parse errors.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Run one completion and return the first text block of the reply.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;

    /// Get the default model name being used.
    fn model_name(&self) -> &str;
}

// =============================================================================
// PERSISTENCE TRAITS
// =============================================================================

/// Insert-only destination for extracted records.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Write one record and return its new id.
    async fn insert(&self, record: &PersistableRecord) -> Result<Uuid>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_request_builder() {
        let req = CompletionRequest::new("Extract", 4096)
            .with_system("You are an API")
            .with_model("claude-sonnet-4-20250514");
        assert_eq!(req.prompt, "Extract");
        assert_eq!(req.max_tokens, 4096);
        assert_eq!(req.system.as_deref(), Some("You are an API"));
        assert_eq!(req.model.as_deref(), Some("claude-sonnet-4-20250514"));
        assert!(req.images.is_empty());
    }

    #[test]
    fn test_traits_are_object_safe() {
        fn _backend(_: &dyn InferenceBackend) {}
        fn _sink(_: &dyn RecordSink) {}
    }
}
