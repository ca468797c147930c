//! Two-stage image identification.
//!
//! Stage 1 reads only the headstock text and is advisory: every failure is
//! logged and swallowed. Stage 2 runs the full specification analysis with
//! the stage 1 brand as a hint, then merges that brand as a weighted prior.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use luthier_core::defaults::{ANALYSIS_MAX_TOKENS, PREPASS_MAX_TOKENS, VISION_MODEL};
use luthier_core::lenient::value_as_text;
use luthier_core::{
    extract_json_as, extract_json_object, CompletionRequest, Error, GuitarAnalysis, ImageContent,
    InferenceBackend, Result,
};

use crate::brand_prior::{is_usable_brand, BrandPrior};
use crate::prompts::{analysis_prompt, HEADSTOCK_PROMPT};

/// Configuration for [`ImagePipeline`].
#[derive(Debug, Clone)]
pub struct ImagePipelineConfig {
    /// Vision-capable model used for both stages.
    pub vision_model: String,
    pub prior: BrandPrior,
}

impl Default for ImagePipelineConfig {
    fn default() -> Self {
        Self {
            vision_model: VISION_MODEL.to_string(),
            prior: BrandPrior::default(),
        }
    }
}

impl ImagePipelineConfig {
    /// Create from environment variables.
    ///
    /// - `ANTHROPIC_VISION_MODEL`
    /// - `BRAND_PRIOR_WEIGHT`, `BRAND_STRONG_EVIDENCE`
    pub fn from_env() -> Self {
        Self {
            vision_model: std::env::var("ANTHROPIC_VISION_MODEL")
                .ok()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| VISION_MODEL.to_string()),
            prior: BrandPrior::from_env(),
        }
    }
}

/// Identifies an instrument from its photos.
#[derive(Clone)]
pub struct ImagePipeline {
    backend: Arc<dyn InferenceBackend>,
    config: ImagePipelineConfig,
}

impl ImagePipeline {
    pub fn new(backend: Arc<dyn InferenceBackend>, config: ImagePipelineConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &ImagePipelineConfig {
        &self.config
    }

    /// Run both stages over `images`.
    ///
    /// Returns [`Error::InvalidInput`] when `images` is empty. Stage 2 errors
    /// are fatal; stage 1 errors never are.
    pub async fn identify(&self, images: Vec<ImageContent>) -> Result<GuitarAnalysis> {
        if images.is_empty() {
            return Err(Error::InvalidInput(
                "Could not load any of the provided images".to_string(),
            ));
        }
        let start = Instant::now();

        let anchor = self.headstock_prepass(&images).await;
        let mut analysis = self.analyze(images, anchor.as_deref()).await?;
        self.config.prior.apply(&mut analysis, anchor.as_deref());

        info!(
            subsystem = "pipeline",
            component = "image",
            op = "identify",
            brand = %analysis.brand.value,
            brand_resolution = analysis.brand_resolution.as_str(),
            confidence = analysis.confidence,
            duration_ms = start.elapsed().as_millis() as u64,
            "Image identification complete"
        );
        Ok(analysis)
    }

    /// Stage 1: read the brand off the headstock.
    ///
    /// `None` when the model could not read a brand or the call failed.
    pub async fn headstock_prepass(&self, images: &[ImageContent]) -> Option<String> {
        let request = CompletionRequest::new(HEADSTOCK_PROMPT, PREPASS_MAX_TOKENS)
            .with_images(images.to_vec())
            .with_model(&self.config.vision_model);

        let reply = match self.backend.complete(request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(
                    subsystem = "pipeline",
                    component = "image",
                    op = "headstock_prepass",
                    error = %e,
                    "Headstock pre-pass failed, continuing without a brand hint"
                );
                return None;
            }
        };

        let brand = match extract_json_object(&reply) {
            Ok((value, _)) => value.get("brand_read").and_then(value_as_text),
            Err(e) => {
                warn!(
                    subsystem = "pipeline",
                    component = "image",
                    op = "headstock_prepass",
                    error = %e,
                    "Headstock pre-pass reply unparseable, continuing without a brand hint"
                );
                return None;
            }
        };

        let brand = brand
            .map(|b| b.trim().to_string())
            .filter(|b| is_usable_brand(b));
        debug!(
            subsystem = "pipeline",
            component = "image",
            op = "headstock_prepass",
            brand = brand.as_deref().unwrap_or(""),
            "Headstock pre-pass finished"
        );
        brand
    }

    /// Stage 2: full specification analysis.
    pub async fn analyze(
        &self,
        images: Vec<ImageContent>,
        headstock_brand: Option<&str>,
    ) -> Result<GuitarAnalysis> {
        let image_count = images.len();
        let request = CompletionRequest::new(analysis_prompt(headstock_brand), ANALYSIS_MAX_TOKENS)
            .with_images(images)
            .with_model(&self.config.vision_model);

        let reply = self.backend.complete(request).await?;
        let (mut analysis, strategy) = extract_json_as::<GuitarAnalysis>(&reply)?;
        analysis.rank_alternatives();

        debug!(
            subsystem = "pipeline",
            component = "image",
            op = "analyze",
            strategy = strategy.as_str(),
            image_count,
            response_len = reply.len(),
            alternatives = analysis.alternatives.len(),
            "Analysis reply parsed"
        );
        Ok(analysis)
    }
}
