//! # luthier-core
//!
//! Core types, traits, and shared utilities for the luthier identification
//! and extraction service.
//!
//! This crate provides the domain records, the error taxonomy, and the
//! model-output helpers (JSON recovery, confidence parsing, fingerprints)
//! that the other luthier crates depend on.

pub mod confidence;
pub mod defaults;
pub mod error;
pub mod fingerprint;
pub mod json_extract;
pub mod lenient;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use confidence::{clamp_confidence, parse_confidence, ConfidenceField, FieldValue};
pub use error::{Error, Result};
pub use fingerprint::dedup_fingerprint;
pub use json_extract::{extract_json_as, extract_json_object, ExtractionStrategy};
pub use models::*;
pub use traits::*;
