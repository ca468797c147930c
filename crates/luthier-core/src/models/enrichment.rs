//! Enrichment phase output and specification normalization.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::confidence::{clamp_confidence, parse_confidence};
use crate::defaults::{
    INFERRED_SPEC_CONFIDENCE, MIN_OBSERVED_NUMBER_LEN, OBSERVED_SPEC_CONFIDENCE, STORY_MAX_WORDS,
    STORY_MIN_WORDS, VERIFICATION_THRESHOLD,
};
use crate::lenient::{self, to_string_list, value_as_text};

/// Where a specification value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Stated in the source text.
    Observed,
    /// Supplied from general domain knowledge.
    Inferred,
}

impl Provenance {
    /// Classify a model's explicit provenance statement.
    pub fn from_statement(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "observed" | "source" | "source_text" | "stated" => Provenance::Observed,
            _ => Provenance::Inferred,
        }
    }
}

/// One normalized specification attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecField {
    pub value: Value,
    pub confidence: f64,
    pub provenance: Provenance,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
}

/// Overall confidence the model reports for an enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionConfidence {
    High,
    Medium,
    #[default]
    Low,
}

impl ExtractionConfidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionConfidence::High => "high",
            ExtractionConfidence::Medium => "medium",
            ExtractionConfidence::Low => "low",
        }
    }
}

fn extraction_confidence<'de, D>(deserializer: D) -> Result<ExtractionConfidence, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(
        match value.as_str().map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("high") => ExtractionConfidence::High,
            Some("medium") => ExtractionConfidence::Medium,
            _ => ExtractionConfidence::Low,
        },
    )
}

fn object_or_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

/// The enrich reply exactly as the model shaped it, before normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEnrichment {
    #[serde(default, deserialize_with = "lenient::string")]
    pub body_style: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub instrument_type: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub finish: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub finish_options: Vec<String>,
    #[serde(default, deserialize_with = "object_or_empty")]
    pub specifications: Map<String, Value>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub story: String,
    #[serde(rename = "_images", default, deserialize_with = "lenient::string_list")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "extraction_confidence")]
    pub extraction_confidence: ExtractionConfidence,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub fields_requiring_verification: Vec<String>,
}

/// Normalized enrichment for one instrument.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub body_style: String,
    pub instrument_type: String,
    pub finish: Option<String>,
    pub finish_options: BTreeSet<String>,
    pub specifications: BTreeMap<String, SpecField>,
    pub story: String,
    #[serde(rename = "_images")]
    pub images: Vec<String>,
    pub extraction_confidence: ExtractionConfidence,
    pub fields_requiring_verification: Vec<String>,
}

impl EnrichedRecord {
    /// Append a field to the verification list unless it is already there.
    pub fn flag_for_verification(&mut self, field: impl Into<String>) {
        let field = field.into();
        if !self.fields_requiring_verification.contains(&field) {
            self.fields_requiring_verification.push(field);
        }
    }
}

impl RawEnrichment {
    /// Normalize into an [`EnrichedRecord`].
    ///
    /// `evidence` is the text the enrichment was grounded on (the source
    /// content and the identity's narrative); a spec value found in it is
    /// `observed`, anything else `inferred`.
    pub fn normalize(self, evidence: &[&str]) -> EnrichedRecord {
        let evidence_lower: Vec<String> = evidence.iter().map(|e| e.to_lowercase()).collect();

        let mut record = EnrichedRecord {
            body_style: self.body_style.trim().to_string(),
            instrument_type: self.instrument_type.trim().to_string(),
            finish: self.finish,
            finish_options: self.finish_options.into_iter().collect(),
            specifications: BTreeMap::new(),
            story: self.story.trim().to_string(),
            images: self.images,
            extraction_confidence: self.extraction_confidence,
            fields_requiring_verification: Vec::new(),
        };

        for field in self.fields_requiring_verification {
            record.flag_for_verification(field);
        }

        let meta = SpecMetadata::from_specifications(&self.specifications);

        for (name, raw) in self.specifications {
            if name.starts_with('_') {
                continue;
            }
            let Some(spec) = normalize_spec(&name, raw, &meta, &evidence_lower) else {
                continue;
            };
            if spec.provenance == Provenance::Inferred && spec.confidence < VERIFICATION_THRESHOLD
            {
                record.flag_for_verification(format!("specifications.{}", name));
            }
            record.specifications.insert(name, spec);
        }

        let words = record.story.split_whitespace().count();
        if !(STORY_MIN_WORDS..=STORY_MAX_WORDS).contains(&words) {
            record.flag_for_verification("story");
        }

        record
    }
}

/// `_confidence` and `_spec_sources` as the model supplied them.
#[derive(Debug, Default)]
struct SpecMetadata {
    global_confidence: Option<f64>,
    field_confidence: BTreeMap<String, f64>,
    global_sources: Vec<String>,
    field_sources: BTreeMap<String, Vec<String>>,
}

impl SpecMetadata {
    fn from_specifications(specs: &Map<String, Value>) -> Self {
        let mut meta = SpecMetadata::default();

        match specs.get("_confidence") {
            Some(Value::Object(per_field)) => {
                for (k, v) in per_field {
                    if let Some(c) = parse_confidence(v) {
                        meta.field_confidence.insert(k.clone(), c);
                    }
                }
            }
            Some(other) => meta.global_confidence = parse_confidence(other),
            None => {}
        }

        match specs.get("_spec_sources") {
            Some(Value::Object(per_field)) => {
                for (k, v) in per_field {
                    let list = to_string_list(v);
                    if !list.is_empty() {
                        meta.field_sources.insert(k.clone(), list);
                    }
                }
            }
            Some(other) => meta.global_sources = to_string_list(other),
            None => {}
        }

        meta
    }
}

fn normalize_spec(
    name: &str,
    raw: Value,
    meta: &SpecMetadata,
    evidence_lower: &[String],
) -> Option<SpecField> {
    let mut explicit_confidence = None;
    let mut explicit_provenance = None;
    let mut sources = Vec::new();

    let value = match raw {
        Value::Object(mut obj) if obj.contains_key("value") => {
            explicit_confidence = obj.get("confidence").and_then(parse_confidence);
            let statement = obj
                .get("provenance")
                .or_else(|| obj.get("source"))
                .and_then(Value::as_str)
                .map(str::to_string);
            if let Some(statement) = statement {
                let provenance = Provenance::from_statement(&statement);
                // A citation in `source` is kept as a source, not just a verdict.
                if provenance == Provenance::Inferred
                    && obj.get("provenance").is_none()
                    && !statement.trim().is_empty()
                {
                    sources.push(statement.trim().to_string());
                }
                explicit_provenance = Some(provenance);
            }
            if let Some(listed) = obj.get("sources") {
                sources.extend(to_string_list(listed));
            }
            obj.remove("value").unwrap_or(Value::Null)
        }
        other => other,
    };

    if is_empty_value(&value) {
        return None;
    }

    let provenance = explicit_provenance.unwrap_or_else(|| {
        if stated_in(&value, evidence_lower) {
            Provenance::Observed
        } else {
            Provenance::Inferred
        }
    });

    let confidence = explicit_confidence
        .or_else(|| meta.field_confidence.get(name).copied())
        .or(meta.global_confidence)
        .unwrap_or(match provenance {
            Provenance::Observed => OBSERVED_SPEC_CONFIDENCE,
            Provenance::Inferred => INFERRED_SPEC_CONFIDENCE,
        });

    if let Some(field_sources) = meta.field_sources.get(name) {
        sources.extend(field_sources.iter().cloned());
    }
    sources.extend(meta.global_sources.iter().cloned());
    let mut seen = BTreeSet::new();
    sources.retain(|s| seen.insert(s.clone()));

    Some(SpecField {
        value,
        confidence: clamp_confidence(confidence),
        provenance,
        sources,
    })
}

/// True when `value` appears in the evidence as a whole token. Booleans and
/// short bare numbers never do.
fn stated_in(value: &Value, evidence_lower: &[String]) -> bool {
    if matches!(value, Value::Bool(_)) {
        return false;
    }
    let Some(rendered) = value_as_text(value) else {
        return false;
    };
    let needle = rendered.trim().to_lowercase();
    if needle.is_empty() {
        return false;
    }
    let numeric = needle.chars().all(|c| c.is_ascii_digit() || c == '.');
    if numeric && needle.len() < MIN_OBSERVED_NUMBER_LEN {
        return false;
    }
    evidence_lower.iter().any(|e| contains_token(e, &needle))
}

fn contains_token(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}
