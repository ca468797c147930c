//! The durable record written once per identified instrument.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::defaults::{CONTENT_EXTRACTION_SOURCE, EARLIEST_PLAUSIBLE_YEAR};
use crate::fingerprint::dedup_fingerprint;
use crate::models::enrichment::{EnrichedRecord, ExtractionConfidence, SpecField};
use crate::models::identity::{InstrumentIdentity, ProductionStatus};

/// Identity + enrichment, ready for the persistence sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistableRecord {
    // Identity
    pub brand: String,
    pub model: String,
    pub year: Option<i32>,
    pub year_range: Option<String>,
    pub serial_number: Option<String>,
    pub finish: Option<String>,
    pub category: Option<String>,
    pub production_status: Option<ProductionStatus>,
    pub context: String,
    #[serde(rename = "_famous_owner", skip_serializing_if = "Option::is_none", default)]
    pub famous_owner: Option<String>,
    #[serde(rename = "_nickname", skip_serializing_if = "Option::is_none", default)]
    pub nickname: Option<String>,
    #[serde(rename = "_notable_events", default)]
    pub notable_events: Vec<String>,
    #[serde(rename = "_ownership_history", default)]
    pub ownership_history: Vec<String>,
    #[serde(rename = "_modification_history", default)]
    pub modification_history: Vec<String>,

    // Enrichment
    pub body_style: String,
    pub instrument_type: String,
    pub finish_options: BTreeSet<String>,
    pub specifications: BTreeMap<String, SpecField>,
    pub story: String,
    #[serde(rename = "_images")]
    pub images: Vec<String>,
    pub extraction_confidence: ExtractionConfidence,
    pub fields_requiring_verification: Vec<String>,

    // Provenance
    pub dedup_fingerprint: String,
    pub source: String,
}

impl PersistableRecord {
    /// Merge an identity with its enrichment.
    ///
    /// The identity's finish wins unless it is empty. A year outside
    /// `1900..=current_year + 1` is flagged for verification, never rejected.
    pub fn assemble(
        identity: &InstrumentIdentity,
        mut enriched: EnrichedRecord,
        current_year: i32,
    ) -> Self {
        if let Some(year) = identity.year {
            if !is_plausible_year(year, current_year) {
                enriched.flag_for_verification("year");
            }
        }

        let finish = identity
            .finish
            .clone()
            .filter(|f| !f.trim().is_empty())
            .or(enriched.finish);

        Self {
            brand: identity.brand.clone(),
            model: identity.model.clone(),
            year: identity.year,
            year_range: identity.year_range.clone(),
            serial_number: identity.serial_number.clone(),
            finish,
            category: identity.category.clone(),
            production_status: identity.production_status,
            context: identity.context.clone(),
            famous_owner: identity.famous_owner.clone(),
            nickname: identity.nickname.clone(),
            notable_events: identity.notable_events.clone(),
            ownership_history: identity.ownership_history.clone(),
            modification_history: identity.modification_history.clone(),
            body_style: enriched.body_style,
            instrument_type: enriched.instrument_type,
            finish_options: enriched.finish_options,
            specifications: enriched.specifications,
            story: enriched.story,
            images: enriched.images,
            extraction_confidence: enriched.extraction_confidence,
            fields_requiring_verification: enriched.fields_requiring_verification,
            dedup_fingerprint: dedup_fingerprint(identity),
            source: CONTENT_EXTRACTION_SOURCE.to_string(),
        }
    }
}

/// True when `year` lies in `1900..=current_year + 1`.
pub fn is_plausible_year(year: i32, current_year: i32) -> bool {
    (EARLIEST_PLAUSIBLE_YEAR..=current_year.saturating_add(1)).contains(&year)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jem7() -> InstrumentIdentity {
        InstrumentIdentity {
            brand: "Ibanez".to_string(),
            model: "JEM7".to_string(),
            year: Some(1987),
            finish: Some("Loch Ness Green".to_string()),
            context: "Bought new in 1987".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_assemble_carries_identity_and_fingerprint() {
        let record = PersistableRecord::assemble(&jem7(), EnrichedRecord::default(), 2026);
        assert_eq!(record.brand, "Ibanez");
        assert_eq!(record.dedup_fingerprint, "ibanez|jem7|1987");
        assert_eq!(record.source, "content_extraction");
        assert_eq!(record.extraction_confidence, ExtractionConfidence::Low);
    }

    #[test]
    fn test_identity_finish_wins() {
        let enriched = EnrichedRecord {
            finish: Some("Green".to_string()),
            ..Default::default()
        };
        let record = PersistableRecord::assemble(&jem7(), enriched, 2026);
        assert_eq!(record.finish.as_deref(), Some("Loch Ness Green"));
    }

    #[test]
    fn test_enriched_finish_used_when_identity_empty() {
        let mut identity = jem7();
        identity.finish = Some("  ".to_string());
        let enriched = EnrichedRecord {
            finish: Some("Loch Ness Green".to_string()),
            ..Default::default()
        };
        let record = PersistableRecord::assemble(&identity, enriched, 2026);
        assert_eq!(record.finish.as_deref(), Some("Loch Ness Green"));
    }

    #[test]
    fn test_implausible_year_flagged_not_rejected() {
        let mut identity = jem7();
        identity.year = Some(2091);
        let record = PersistableRecord::assemble(&identity, EnrichedRecord::default(), 2026);
        assert_eq!(record.year, Some(2091));
        assert!(record.fields_requiring_verification.contains(&"year".to_string()));
    }

    #[test]
    fn test_plausible_year_bounds() {
        assert!(is_plausible_year(1900, 2026));
        assert!(is_plausible_year(2027, 2026));
        assert!(!is_plausible_year(1899, 2026));
        assert!(!is_plausible_year(2028, 2026));
    }
}
