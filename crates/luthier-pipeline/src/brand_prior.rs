//! Merging the headstock pre-pass brand into the full analysis.
//!
//! The analysis prompt already carries the pre-pass brand as a hint. The
//! model may still disagree, so the hint is also applied as a weighted prior
//! once the analysis is back:
//!
//! | Pre-pass | Analysis brand | Outcome |
//! |----------|----------------|---------|
//! | none | any | `no_anchor`, unchanged |
//! | same brand | any confidence | `confirmed`, confidence combined |
//! | different | `>= strong_evidence` | `model_kept`, anchor added to alternatives |
//! | different | `< strong_evidence` | `anchor_applied`, analysis brand moved to alternatives |

use tracing::debug;

use luthier_core::defaults::{BRAND_PRIOR_WEIGHT, BRAND_STRONG_EVIDENCE, MAX_ALTERNATIVES, UNKNOWN};
use luthier_core::{clamp_confidence, Alternative, BrandResolution, ConfidenceField, GuitarAnalysis};

/// Reason recorded when the anchor replaces the analysis brand.
pub const OVERRIDDEN_REASON: &str = "Full analysis reading overridden by headstock text scan";

/// Reason recorded when the analysis keeps its brand against the anchor.
pub const ANCHOR_KEPT_REASON: &str = "Brand read by headstock text scan";

/// Weighted-prior parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrandPrior {
    /// Confidence carried by the anchor brand, in `[0, 1]`.
    pub weight: f64,
    /// Analysis confidence at or above which a disagreeing brand stands.
    pub strong_evidence: f64,
}

impl Default for BrandPrior {
    fn default() -> Self {
        Self {
            weight: BRAND_PRIOR_WEIGHT,
            strong_evidence: BRAND_STRONG_EVIDENCE,
        }
    }
}

impl BrandPrior {
    pub fn new(weight: f64, strong_evidence: f64) -> Self {
        Self {
            weight: clamp_confidence(weight),
            strong_evidence: clamp_confidence(strong_evidence),
        }
    }

    /// Read `BRAND_PRIOR_WEIGHT` and `BRAND_STRONG_EVIDENCE`, falling back to
    /// the defaults.
    pub fn from_env() -> Self {
        let read = |key: &str, default: f64| {
            std::env::var(key)
                .ok()
                .and_then(|v| v.trim().parse::<f64>().ok())
                .unwrap_or(default)
        };
        Self::new(
            read("BRAND_PRIOR_WEIGHT", BRAND_PRIOR_WEIGHT),
            read("BRAND_STRONG_EVIDENCE", BRAND_STRONG_EVIDENCE),
        )
    }

    /// Reconcile `analysis` with the pre-pass `anchor` in place.
    ///
    /// Sets `headstock_brand` and `brand_resolution` on the analysis and
    /// returns the resolution.
    pub fn apply(&self, analysis: &mut GuitarAnalysis, anchor: Option<&str>) -> BrandResolution {
        let anchor = anchor.map(str::trim).filter(|a| is_usable_brand(a));
        analysis.headstock_brand = anchor.map(str::to_string);

        let resolution = match anchor {
            None => BrandResolution::NoAnchor,
            Some(anchor) if same_brand(anchor, &analysis.brand.value) => {
                let combined = 1.0 - (1.0 - analysis.brand.confidence) * (1.0 - self.weight);
                analysis.brand.confidence = clamp_confidence(combined);
                BrandResolution::Confirmed
            }
            Some(anchor) if analysis.brand.confidence >= self.strong_evidence => {
                if !analysis.has_alternative_brand(anchor) {
                    let model = analysis.model.value.clone();
                    record_alternative(
                        analysis,
                        Alternative {
                            brand: anchor.to_string(),
                            model,
                            confidence: self.weight,
                            reason: ANCHOR_KEPT_REASON.to_string(),
                        },
                    );
                }
                BrandResolution::ModelKept
            }
            Some(anchor) => {
                let previous_brand = std::mem::replace(
                    &mut analysis.brand,
                    ConfidenceField::new(anchor.to_string(), self.weight),
                );
                if !previous_brand.is_unknown() {
                    let model = analysis.model.value.clone();
                    record_alternative(
                        analysis,
                        Alternative {
                            brand: previous_brand.value,
                            model,
                            confidence: previous_brand.confidence,
                            reason: OVERRIDDEN_REASON.to_string(),
                        },
                    );
                }
                BrandResolution::AnchorApplied
            }
        };

        debug!(
            subsystem = "pipeline",
            component = "brand_prior",
            resolution = resolution.as_str(),
            anchor = anchor.unwrap_or(""),
            brand = %analysis.brand.value,
            brand_confidence = analysis.brand.confidence,
            "Brand prior applied"
        );

        analysis.brand_resolution = resolution;
        resolution
    }
}

/// True for a pre-pass reading that names a brand.
pub fn is_usable_brand(brand: &str) -> bool {
    let brand = brand.trim();
    !brand.is_empty() && !brand.eq_ignore_ascii_case(UNKNOWN)
}

/// Case- and whitespace-insensitive brand equality.
pub fn same_brand(a: &str, b: &str) -> bool {
    let normalize = |s: &str| {
        s.chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect::<String>()
    };
    normalize(a) == normalize(b)
}

/// Add an alternative without letting the cap push it back out.
fn record_alternative(analysis: &mut GuitarAnalysis, alternative: Alternative) {
    analysis.rank_alternatives();
    if analysis.alternatives.len() >= MAX_ALTERNATIVES {
        analysis.alternatives.pop();
    }
    analysis.alternatives.push(alternative);
    analysis.rank_alternatives();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(brand: &str, confidence: f64) -> GuitarAnalysis {
        GuitarAnalysis {
            confidence: 0.8,
            brand: ConfidenceField::new(brand.to_string(), confidence),
            model: ConfidenceField::new("S-63".to_string(), 0.7),
            ..Default::default()
        }
    }

    fn alt(brand: &str, confidence: f64) -> Alternative {
        Alternative {
            brand: brand.to_string(),
            model: "X".to_string(),
            confidence,
            reason: String::new(),
        }
    }

    #[test]
    fn test_no_anchor_leaves_analysis_unchanged() {
        let prior = BrandPrior::default();
        let mut a = analysis("Fender", 0.6);
        let before = a.clone();

        assert_eq!(prior.apply(&mut a, None), BrandResolution::NoAnchor);
        assert_eq!(a.brand, before.brand);
        assert_eq!(a.alternatives, before.alternatives);
        assert_eq!(a.headstock_brand, None);
        assert_eq!(a.brand_resolution, BrandResolution::NoAnchor);
    }

    #[test]
    fn test_unknown_sentinel_is_no_anchor() {
        let prior = BrandPrior::default();
        let mut a = analysis("Fender", 0.6);
        assert_eq!(prior.apply(&mut a, Some("Unknown")), BrandResolution::NoAnchor);
        assert_eq!(prior.apply(&mut a, Some("  ")), BrandResolution::NoAnchor);
    }

    #[test]
    fn test_matching_anchor_confirms_and_raises_confidence() {
        let prior = BrandPrior::default();
        let mut a = analysis("Nash", 0.6);

        assert_eq!(prior.apply(&mut a, Some("  nash ")), BrandResolution::Confirmed);
        // 1 - (1 - 0.6)(1 - 0.75) = 0.9
        assert!((a.brand.confidence - 0.9).abs() < 1e-9);
        assert_eq!(a.brand.value, "Nash");
        assert_eq!(a.headstock_brand.as_deref(), Some("nash"));
    }

    #[test]
    fn test_whitespace_insensitive_match() {
        assert!(same_brand("Tom Anderson", "tomanderson"));
        assert!(!same_brand("Nash", "Nashguitars"));
    }

    #[test]
    fn test_confident_model_keeps_brand() {
        let prior = BrandPrior::default();
        let mut a = analysis("Fender", 0.9);

        assert_eq!(prior.apply(&mut a, Some("Nash")), BrandResolution::ModelKept);
        assert_eq!(a.brand.value, "Fender");
        assert_eq!(a.brand.confidence, 0.9);
        assert!(a.has_alternative_brand("Nash"));
        assert_eq!(a.alternatives[0].reason, ANCHOR_KEPT_REASON);
    }

    #[test]
    fn test_model_kept_does_not_duplicate_existing_alternative() {
        let prior = BrandPrior::default();
        let mut a = analysis("Fender", 0.95);
        a.alternatives = vec![alt("nash", 0.3)];

        prior.apply(&mut a, Some("Nash"));
        assert_eq!(a.alternatives.len(), 1);
        assert_eq!(a.alternatives[0].confidence, 0.3);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let prior = BrandPrior::default();
        let mut a = analysis("Fender", 0.85);
        assert_eq!(prior.apply(&mut a, Some("Nash")), BrandResolution::ModelKept);
    }

    #[test]
    fn test_weak_model_brand_is_overridden() {
        let prior = BrandPrior::default();
        let mut a = analysis("Fender", 0.5);
        a.alternatives = vec![alt("Suhr", 0.4), alt("Squier", 0.2)];

        assert_eq!(prior.apply(&mut a, Some("Nash")), BrandResolution::AnchorApplied);
        assert_eq!(a.brand.value, "Nash");
        assert_eq!(a.brand.confidence, 0.75);

        let overridden = a
            .alternatives
            .iter()
            .find(|alt| alt.brand == "Fender")
            .expect("original brand kept as an alternative");
        assert_eq!(overridden.model, "S-63");
        assert_eq!(overridden.confidence, 0.5);
        assert_eq!(overridden.reason, OVERRIDDEN_REASON);

        // Ranked highest first.
        let confidences: Vec<f64> = a.alternatives.iter().map(|a| a.confidence).collect();
        assert_eq!(confidences, vec![0.5, 0.4, 0.2]);
    }

    #[test]
    fn test_unknown_model_brand_not_recorded_as_alternative() {
        let prior = BrandPrior::default();
        let mut a = GuitarAnalysis::default();

        assert_eq!(prior.apply(&mut a, Some("Suhr")), BrandResolution::AnchorApplied);
        assert_eq!(a.brand.value, "Suhr");
        assert!(a.alternatives.is_empty());
    }

    #[test]
    fn test_recorded_alternative_survives_the_cap() {
        let prior = BrandPrior::default();
        let mut a = analysis("Fender", 0.9);
        a.alternatives = vec![
            alt("A", 0.8),
            alt("B", 0.7),
            alt("C", 0.6),
            alt("D", 0.5),
        ];

        prior.apply(&mut a, Some("Nash"));
        assert_eq!(a.alternatives.len(), MAX_ALTERNATIVES);
        assert!(a.has_alternative_brand("Nash"));
        assert!(!a.has_alternative_brand("D"));
    }

    #[test]
    fn test_custom_weights() {
        let prior = BrandPrior::new(0.5, 0.95);
        let mut a = analysis("Fender", 0.9);

        assert_eq!(prior.apply(&mut a, Some("Nash")), BrandResolution::AnchorApplied);
        assert_eq!(a.brand.confidence, 0.5);
    }

    #[test]
    fn test_new_clamps() {
        let prior = BrandPrior::new(1.5, -1.0);
        assert_eq!(prior.weight, 1.0);
        assert_eq!(prior.strong_evidence, 0.0);
    }
}
