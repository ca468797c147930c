//! Domain models for instrument identification and content extraction.

pub mod analysis;
pub mod enrichment;
pub mod identity;
pub mod record;

pub use analysis::{Alternative, BrandResolution, GuitarAnalysis};
pub use enrichment::{EnrichedRecord, ExtractionConfidence, Provenance, RawEnrichment, SpecField};
pub use identity::{IdentifyPhaseResponse, InstrumentIdentity, ProductionStatus, SourceType};
pub use record::{is_plausible_year, PersistableRecord};
