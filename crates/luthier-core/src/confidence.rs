//! Confidence-scored field values.
//!
//! Every attribute the image pipeline reports is a [`ConfidenceField`]: a value
//! plus a score in `[0, 1]`. Undeterminable attributes are still present, as the
//! unknown marker with confidence `0.0`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::defaults::{CONFIDENCE_HIGH, CONFIDENCE_LOW, CONFIDENCE_MEDIUM, UNKNOWN};
use crate::lenient::value_as_text;

/// Values that can live inside a [`ConfidenceField`].
pub trait FieldValue: Sized {
    /// The "cannot be determined" marker.
    fn unknown() -> Self;

    /// Convert a model-produced JSON value, or `None` if it carries nothing.
    fn from_json(value: &Value) -> Option<Self>;
}

impl FieldValue for String {
    fn unknown() -> Self {
        UNKNOWN.to_string()
    }

    fn from_json(value: &Value) -> Option<Self> {
        value_as_text(value)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

impl FieldValue for Value {
    fn unknown() -> Self {
        Value::String(UNKNOWN.to_string())
    }

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            other => Some(other.clone()),
        }
    }
}

impl FieldValue for i32 {
    fn unknown() -> Self {
        0
    }

    fn from_json(value: &Value) -> Option<Self> {
        crate::lenient::parse_year(value)
    }
}

/// A value with an attached confidence score in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceField<T> {
    pub value: T,
    pub confidence: f64,
}

impl<T: FieldValue> ConfidenceField<T> {
    /// Create a field, clamping `confidence` into `[0, 1]`.
    pub fn new(value: T, confidence: f64) -> Self {
        Self {
            value,
            confidence: clamp_confidence(confidence),
        }
    }

    /// The unknown marker with zero confidence.
    pub fn unknown() -> Self {
        Self {
            value: T::unknown(),
            confidence: 0.0,
        }
    }

    /// Build from any JSON shape a model might emit:
    /// `{value, confidence}`, a bare scalar, or `null`.
    pub fn from_json(raw: &Value) -> Self {
        match raw {
            Value::Object(map) => {
                let value = map.get("value").and_then(T::from_json);
                match value {
                    Some(v) => {
                        let confidence = map
                            .get("confidence")
                            .and_then(parse_confidence)
                            .unwrap_or(0.0);
                        Self::new(v, confidence)
                    }
                    None => Self::unknown(),
                }
            }
            other => match T::from_json(other) {
                Some(v) => Self::new(v, 0.0),
                None => Self::unknown(),
            },
        }
    }
}

impl ConfidenceField<String> {
    /// True when the value is the unknown marker or blank.
    pub fn is_unknown(&self) -> bool {
        let v = self.value.trim();
        v.is_empty() || v.eq_ignore_ascii_case(UNKNOWN)
    }
}

impl<T: FieldValue> Default for ConfidenceField<T> {
    fn default() -> Self {
        Self::unknown()
    }
}

impl<'de, T: FieldValue> Deserialize<'de> for ConfidenceField<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Ok(Self::from_json(&raw))
    }
}

/// Interpret a model-stated confidence: a number, a numeric string, or one of
/// the words `high`, `medium`, `low`. Unrecognized input yields `None`.
pub fn parse_confidence(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().map(clamp_confidence),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(n) = s.parse::<f64>() {
                return Some(clamp_confidence(n));
            }
            match s.to_ascii_lowercase().as_str() {
                "high" => Some(CONFIDENCE_HIGH),
                "medium" => Some(CONFIDENCE_MEDIUM),
                "low" => Some(CONFIDENCE_LOW),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Clamp into `[0, 1]`; NaN becomes `0`.
pub fn clamp_confidence(c: f64) -> f64 {
    if c.is_nan() {
        0.0
    } else {
        c.clamp(0.0, 1.0)
    }
}
