//! Two-phase content extraction.
//!
//! Identify finds every instrument in a source text. Enrich then runs once
//! per instrument and persists the result. Each enrich+persist attempt is
//! its own failure domain: a failure is logged and reported in the outcome,
//! and the batch carries on.

use std::sync::Arc;
use std::time::Instant;

use chrono::{Datelike, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use luthier_core::defaults::{ENRICH_MAX_TOKENS, EXTRACT_CONCURRENCY, IDENTIFY_MAX_TOKENS, TEXT_MODEL};
use luthier_core::{
    extract_json_as, CompletionRequest, IdentifyPhaseResponse, InferenceBackend,
    InstrumentIdentity, PersistableRecord, RawEnrichment, RecordSink, Result,
};

use crate::prompts::{enrich_prompt, identify_prompt, ENRICH_SYSTEM, IDENTIFY_SYSTEM};

/// Which part of the extraction a request runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Identify, then enrich and persist everything found.
    Full,
    /// Identify only; nothing is persisted.
    Identify,
    /// Enrich and persist caller-supplied identities.
    Enrich,
}

impl Phase {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "full" => Some(Phase::Full),
            "identify" => Some(Phase::Identify),
            "enrich" => Some(Phase::Enrich),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Full => "full",
            Phase::Identify => "identify",
            Phase::Enrich => "enrich",
        }
    }

    /// True for phases that start from source text.
    pub fn needs_source(&self) -> bool {
        matches!(self, Phase::Full | Phase::Identify)
    }
}

/// Configuration for [`ContentPipeline`].
#[derive(Debug, Clone)]
pub struct ContentPipelineConfig {
    pub text_model: String,
    /// Enrich+persist attempts in flight at once; 1 runs strictly in order.
    pub concurrency: usize,
}

impl Default for ContentPipelineConfig {
    fn default() -> Self {
        Self {
            text_model: TEXT_MODEL.to_string(),
            concurrency: EXTRACT_CONCURRENCY,
        }
    }
}

impl ContentPipelineConfig {
    /// Create from environment variables.
    ///
    /// - `ANTHROPIC_TEXT_MODEL`
    /// - `EXTRACT_CONCURRENCY` (clamped to at least 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            text_model: std::env::var("ANTHROPIC_TEXT_MODEL")
                .ok()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(defaults.text_model),
            concurrency: std::env::var("EXTRACT_CONCURRENCY")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.concurrency)
                .max(1),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

/// One batch item that was not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedItem {
    /// Position in the input list.
    pub index: usize,
    pub brand: String,
    pub model: String,
    pub error: String,
}

/// Result of an enrich+persist batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Persisted records, in input order. A record whose insert failed is
    /// reported under `failed` only, never here.
    pub guitars: Vec<PersistableRecord>,
    pub inserted: usize,
    pub failed: Vec<FailedItem>,
}

/// Extracts instrument records from free-form text.
#[derive(Clone)]
pub struct ContentPipeline {
    backend: Arc<dyn InferenceBackend>,
    sink: Arc<dyn RecordSink>,
    config: ContentPipelineConfig,
}

impl ContentPipeline {
    pub fn new(
        backend: Arc<dyn InferenceBackend>,
        sink: Arc<dyn RecordSink>,
        config: ContentPipelineConfig,
    ) -> Self {
        Self {
            backend,
            sink,
            config,
        }
    }

    pub fn config(&self) -> &ContentPipelineConfig {
        &self.config
    }

    /// Phase 1: find every instrument in `source`.
    ///
    /// An empty `guitars` list is a valid result. An unparseable reply is not.
    pub async fn identify(&self, source: &str) -> Result<IdentifyPhaseResponse> {
        let start = Instant::now();
        let request = CompletionRequest::new(identify_prompt(source), IDENTIFY_MAX_TOKENS)
            .with_system(IDENTIFY_SYSTEM)
            .with_model(&self.config.text_model);

        let reply = self.backend.complete(request).await?;
        let (response, strategy) = extract_json_as::<IdentifyPhaseResponse>(&reply)?;

        info!(
            subsystem = "pipeline",
            component = "content",
            op = "identify",
            strategy = strategy.as_str(),
            instrument_count = response.guitars.len(),
            reason = response.error.as_deref().unwrap_or(""),
            duration_ms = start.elapsed().as_millis() as u64,
            "Identify phase complete"
        );
        Ok(response)
    }

    /// Phase 2 for one instrument: enrich and assemble, without persisting.
    pub async fn enrich(&self, identity: &InstrumentIdentity, source: &str) -> Result<PersistableRecord> {
        let request = CompletionRequest::new(enrich_prompt(identity, source), ENRICH_MAX_TOKENS)
            .with_system(ENRICH_SYSTEM)
            .with_model(&self.config.text_model);

        let reply = self.backend.complete(request).await?;
        let (raw, strategy) = extract_json_as::<RawEnrichment>(&reply)?;
        let enriched = raw.normalize(&[source, identity.context.as_str()]);
        let record = PersistableRecord::assemble(identity, enriched, Utc::now().year());

        debug!(
            subsystem = "pipeline",
            component = "content",
            op = "enrich",
            strategy = strategy.as_str(),
            fingerprint = %record.dedup_fingerprint,
            spec_count = record.specifications.len(),
            flagged = record.fields_requiring_verification.len(),
            "Enrichment assembled"
        );
        Ok(record)
    }

    /// Enrich and persist every identity, isolating failures per item.
    pub async fn enrich_and_persist(
        &self,
        identities: &[InstrumentIdentity],
        source: &str,
    ) -> BatchOutcome {
        let start = Instant::now();

        // Each item future owns its inputs so the batch future stays `Send`.
        let source: Arc<str> = Arc::from(source);
        let items: Vec<(usize, InstrumentIdentity)> =
            identities.iter().cloned().enumerate().collect();

        let results: Vec<(usize, Result<PersistableRecord>)> = stream::iter(items)
            .map(|(index, identity)| {
                let pipeline = self.clone();
                let source = Arc::clone(&source);
                async move { (index, pipeline.enrich_and_insert(&identity, &source).await) }
            })
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        let mut outcome = BatchOutcome::default();
        for (index, result) in results {
            match result {
                Ok(record) => outcome.guitars.push(record),
                Err(e) => {
                    let identity = &identities[index];
                    error!(
                        subsystem = "pipeline",
                        component = "content",
                        op = "enrich",
                        item_index = index,
                        brand = %identity.brand,
                        model = %identity.model,
                        error = %e,
                        "Dropping instrument from batch"
                    );
                    outcome.failed.push(FailedItem {
                        index,
                        brand: identity.brand.clone(),
                        model: identity.model.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        outcome.inserted = outcome.guitars.len();

        info!(
            subsystem = "pipeline",
            component = "content",
            op = "enrich_batch",
            instrument_count = identities.len(),
            inserted = outcome.inserted,
            failed = outcome.failed.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Enrichment batch complete"
        );
        outcome
    }

    /// Identify, then enrich and persist everything found.
    pub async fn run_full(&self, source: &str) -> Result<BatchOutcome> {
        let identified = self.identify(source).await?;
        Ok(self.enrich_and_persist(&identified.guitars, source).await)
    }

    async fn enrich_and_insert(
        &self,
        identity: &InstrumentIdentity,
        source: &str,
    ) -> Result<PersistableRecord> {
        let record = self.enrich(identity, source).await?;
        let id = self.sink.insert(&record).await?;
        debug!(
            subsystem = "pipeline",
            component = "content",
            op = "insert",
            fingerprint = %record.dedup_fingerprint,
            %id,
            "Instrument persisted"
        );
        Ok(record)
    }
}
