//! # luthier-pipeline
//!
//! The two request pipelines and their prompts.
//!
//! - [`image::ImagePipeline`]: headstock pre-pass, full specification
//!   analysis, brand prior merge
//! - [`content::ContentPipeline`]: identify phase, per-instrument enrich
//!   phase, partial-failure-tolerant persistence
//! - [`proxy::forward`]: caller-built prompts passed straight through
//!
//! Pipelines depend only on the [`luthier_core::InferenceBackend`] and
//! [`luthier_core::RecordSink`] seams, so tests drive them with the mock
//! backend and an in-memory sink.

pub mod brand_prior;
pub mod content;
pub mod image;
pub mod prompts;
pub mod proxy;
pub mod source;

pub use brand_prior::BrandPrior;
pub use content::{BatchOutcome, ContentPipeline, ContentPipelineConfig, FailedItem, Phase};
pub use image::{ImagePipeline, ImagePipelineConfig};
pub use source::compose_source;
