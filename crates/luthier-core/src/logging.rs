//! Structured logging schema and field name constants for luthier.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation can query by the same names across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Request failed, or a batch item was dropped |
//! | WARN  | Recoverable issue, automatic fallback applied (pre-pass, skipped image) |
//! | INFO  | Lifecycle events (startup, shutdown), phase completions |
//! | DEBUG | Decision points, chosen extraction strategy, config choices |
//! | TRACE | Raw model replies |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated from the inbound request (UUIDv7).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "pipeline", "db", "inference"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "image", "content", "anthropic", "images", "pool", "seed_instruments"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "headstock_prepass", "analyze", "identify", "enrich", "insert"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Dedup fingerprint of the instrument being processed.
pub const FINGERPRINT: &str = "fingerprint";

/// Position of an item within an enrichment batch.
pub const ITEM_INDEX: &str = "item_index";

/// Extraction phase ("full", "identify", "enrich").
pub const PHASE: &str = "phase";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Byte length of a prompt.
pub const PROMPT_LEN: &str = "prompt_len";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

/// Number of images attached to an inference request.
pub const IMAGE_COUNT: &str = "image_count";

/// Number of instruments identified in a source text.
pub const INSTRUMENT_COUNT: &str = "instrument_count";

/// Number of records successfully inserted by a batch.
pub const INSERTED: &str = "inserted";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for inference.
pub const MODEL: &str = "model";

/// JSON extraction strategy that recovered the reply.
pub const STRATEGY: &str = "strategy";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

/// Database table affected.
pub const DB_TABLE: &str = "db_table";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names_are_unique_snake_case() {
        let fields = [
            REQUEST_ID, SUBSYSTEM, COMPONENT, OPERATION, FINGERPRINT, ITEM_INDEX, PHASE,
            DURATION_MS, PROMPT_LEN, RESPONSE_LEN, IMAGE_COUNT, INSTRUMENT_COUNT, INSERTED, MODEL,
            STRATEGY, POOL_SIZE, POOL_IDLE, DB_TABLE, SUCCESS, ERROR_MSG,
        ];
        let mut seen = std::collections::HashSet::new();
        for field in fields {
            assert!(field.chars().all(|c| c.is_ascii_lowercase() || c == '_'), "{field}");
            assert!(seen.insert(field), "duplicate field {field}");
        }
    }
}
