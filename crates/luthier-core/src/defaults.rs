//! Centralized default constants for luthier.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates reference these constants instead of defining their own magic
//! numbers. Organized by domain area.

// =============================================================================
// INFERENCE SERVICE
// =============================================================================

/// Default Anthropic Messages API base URL.
pub const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1";

/// Anthropic API version header value.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Model used for image identification.
pub const VISION_MODEL: &str = "claude-sonnet-4-5-20250929";

/// Model used for content extraction and the proxy passthrough.
pub const TEXT_MODEL: &str = "claude-sonnet-4-20250514";

/// Inference request timeout in seconds.
pub const INFERENCE_TIMEOUT_SECS: u64 = 300;

/// Environment variable holding the inference credential.
pub const ENV_ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";

// =============================================================================
// REPLY TOKEN LIMITS
// =============================================================================

/// Headstock pre-pass reply token limit.
pub const PREPASS_MAX_TOKENS: u32 = 256;

/// Full specification analysis reply token limit.
pub const ANALYSIS_MAX_TOKENS: u32 = 3000;

/// Identify phase reply token limit.
pub const IDENTIFY_MAX_TOKENS: u32 = 4096;

/// Enrich phase reply token limit.
pub const ENRICH_MAX_TOKENS: u32 = 2048;

/// Proxy passthrough reply token limit.
pub const PROXY_MAX_TOKENS: u32 = 4096;

// =============================================================================
// IMAGES
// =============================================================================

/// Maximum number of images sent to the inference service per request.
pub const MAX_IMAGES: usize = 5;

/// Per-image fetch timeout in seconds.
pub const IMAGE_FETCH_TIMEOUT_SECS: u64 = 30;

/// Media type assumed when neither the server nor the bytes tell us.
pub const FALLBACK_IMAGE_MEDIA_TYPE: &str = "image/jpeg";

// =============================================================================
// BRAND PRIOR
// =============================================================================

/// Weight of the headstock pre-pass brand when merged into the final brand.
pub const BRAND_PRIOR_WEIGHT: f64 = 0.75;

/// Model brand confidence at or above which the model may overrule the anchor.
pub const BRAND_STRONG_EVIDENCE: f64 = 0.85;

// =============================================================================
// CONFIDENCE
// =============================================================================

/// Confidence assigned to the word "high".
pub const CONFIDENCE_HIGH: f64 = 0.9;

/// Confidence assigned to the word "medium".
pub const CONFIDENCE_MEDIUM: f64 = 0.6;

/// Confidence assigned to the word "low".
pub const CONFIDENCE_LOW: f64 = 0.3;

/// Default confidence for a spec value found in the source text.
pub const OBSERVED_SPEC_CONFIDENCE: f64 = 0.9;

/// Default confidence for a spec value supplied from model knowledge.
pub const INFERRED_SPEC_CONFIDENCE: f64 = 0.5;

/// Bare numbers shorter than this never count as found in the source text.
pub const MIN_OBSERVED_NUMBER_LEN: usize = 3;

/// Inferred specs below this confidence are flagged for human verification.
pub const VERIFICATION_THRESHOLD: f64 = 0.5;

/// Maximum number of alternative identifications kept.
pub const MAX_ALTERNATIVES: usize = 4;

// =============================================================================
// CONTENT EXTRACTION
// =============================================================================

/// Provenance tag written with every extracted record.
pub const CONTENT_EXTRACTION_SOURCE: &str = "content_extraction";

/// Sentinel used for unknown values.
pub const UNKNOWN: &str = "unknown";

/// Concurrent enrich+persist attempts within one batch.
pub const EXTRACT_CONCURRENCY: usize = 4;

/// Story length bounds (words).
pub const STORY_MIN_WORDS: usize = 150;
pub const STORY_MAX_WORDS: usize = 500;

/// Earliest plausible instrument year.
pub const EARLIEST_PLAUSIBLE_YEAR: i32 = 1900;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Maximum request body size in bytes (inline images are large).
pub const MAX_BODY_SIZE_BYTES: usize = 50 * 1024 * 1024;

/// Default database URL.
pub const DATABASE_URL: &str = "postgres://localhost/luthier";
