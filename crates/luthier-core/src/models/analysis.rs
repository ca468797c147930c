//! Image identification output.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::confidence::{parse_confidence, ConfidenceField};
use crate::defaults::MAX_ALTERNATIVES;
use crate::lenient;

/// How the headstock pre-pass brand was reconciled with the full analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrandResolution {
    /// The pre-pass produced no brand.
    #[default]
    NoAnchor,
    /// Both passes agree.
    Confirmed,
    /// They disagree and the full analysis was confident enough to stand.
    ModelKept,
    /// They disagree and the pre-pass brand replaced the analysis brand.
    AnchorApplied,
}

impl BrandResolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrandResolution::NoAnchor => "no_anchor",
            BrandResolution::Confirmed => "confirmed",
            BrandResolution::ModelKept => "model_kept",
            BrandResolution::AnchorApplied => "anchor_applied",
        }
    }
}

/// A ranked alternative identification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    #[serde(default, deserialize_with = "lenient::string")]
    pub brand: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub model: String,
    #[serde(default, deserialize_with = "confidence_score")]
    pub confidence: f64,
    #[serde(default, deserialize_with = "lenient::string")]
    pub reason: String,
}

fn confidence_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_confidence(&value).unwrap_or(0.0))
}

/// Entries that are not objects are dropped instead of failing the reply.
fn alternatives<'de, D>(deserializer: D) -> Result<Vec<Alternative>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Full specification analysis of an instrument photo set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuitarAnalysis {
    #[serde(default, deserialize_with = "confidence_score")]
    pub confidence: f64,
    #[serde(default)]
    pub brand: ConfidenceField<String>,
    #[serde(default)]
    pub model: ConfidenceField<String>,
    #[serde(default)]
    pub year: ConfidenceField<String>,
    #[serde(default)]
    pub country: ConfidenceField<String>,
    #[serde(default)]
    pub body_type: ConfidenceField<String>,
    #[serde(default)]
    pub finish: ConfidenceField<String>,
    #[serde(default)]
    pub color: ConfidenceField<String>,
    #[serde(default)]
    pub top_wood: ConfidenceField<String>,
    #[serde(default)]
    pub body_wood: ConfidenceField<String>,
    #[serde(default)]
    pub neck_wood: ConfidenceField<String>,
    #[serde(default)]
    pub fretboard_wood: ConfidenceField<String>,
    #[serde(default)]
    pub neck_profile: ConfidenceField<String>,
    #[serde(default)]
    pub scale_length: ConfidenceField<String>,
    #[serde(default)]
    pub frets: ConfidenceField<String>,
    #[serde(default)]
    pub pickup_config: ConfidenceField<String>,
    #[serde(default)]
    pub pickups: ConfidenceField<String>,
    #[serde(default)]
    pub controls: ConfidenceField<String>,
    #[serde(default)]
    pub bridge: ConfidenceField<String>,
    #[serde(default)]
    pub bridge_type: ConfidenceField<String>,
    #[serde(default)]
    pub tuners: ConfidenceField<String>,
    #[serde(default)]
    pub nut_material: ConfidenceField<String>,
    #[serde(default)]
    pub hardware_finish: ConfidenceField<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub notes: String,
    #[serde(default, deserialize_with = "alternatives")]
    pub alternatives: Vec<Alternative>,

    /// Brand read by the headstock pre-pass, if any.
    #[serde(default)]
    pub headstock_brand: Option<String>,
    #[serde(default)]
    pub brand_resolution: BrandResolution,
}

impl GuitarAnalysis {
    /// Sort alternatives by confidence (highest first) and keep at most four.
    pub fn rank_alternatives(&mut self) {
        self.alternatives
            .sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        self.alternatives.truncate(MAX_ALTERNATIVES);
    }

    /// True when an alternative already names `brand` (case-insensitive).
    pub fn has_alternative_brand(&self, brand: &str) -> bool {
        let brand = brand.trim();
        self.alternatives
            .iter()
            .any(|alt| alt.brand.trim().eq_ignore_ascii_case(brand))
    }
}
