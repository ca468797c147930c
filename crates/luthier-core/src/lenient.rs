//! Tolerant serde helpers for model-produced JSON.
//!
//! Model replies drift in type (`"1987"` vs `1987`, `null` vs `""`), so the
//! deserializers here accept the reasonable variants instead of rejecting the
//! whole reply.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Render a scalar JSON value as text. `null` yields `None`, arrays of scalars
/// are joined with ", ".
pub fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(value_as_text).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        Value::Object(_) => Some(value.to_string()),
    }
}

/// String field; `null`, numbers and booleans are accepted.
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_text(&value).unwrap_or_default())
}

/// Optional string field; blank strings become `None`.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_text(&value)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// Year field: integer, float with no fraction, or numeric string.
/// Anything else (including `"1980s"`) is `None`.
pub fn year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_year(&value))
}

pub fn parse_year(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .and_then(|y| i32::try_from(y).ok()),
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    }
}

/// List of strings; a single string becomes a one-element list, `null` an
/// empty list, and non-string entries are rendered as text.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(to_string_list(&value))
}

pub fn to_string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(value_as_text)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Value::Null => Vec::new(),
        other => value_as_text(other)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .into_iter()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "string")]
        s: String,
        #[serde(default, deserialize_with = "opt_string")]
        o: Option<String>,
        #[serde(default, deserialize_with = "year")]
        y: Option<i32>,
        #[serde(default, deserialize_with = "string_list")]
        l: Vec<String>,
    }

    #[test]
    fn test_numeric_string_year() {
        let p: Probe = serde_json::from_value(json!({"y": "1987"})).unwrap();
        assert_eq!(p.y, Some(1987));
    }

    #[test]
    fn test_decade_year_is_none() {
        let p: Probe = serde_json::from_value(json!({"y": "1980s"})).unwrap();
        assert_eq!(p.y, None);
    }

    #[test]
    fn test_float_year() {
        let p: Probe = serde_json::from_value(json!({"y": 1959.0})).unwrap();
        assert_eq!(p.y, Some(1959));
    }

    #[test]
    fn test_null_string_becomes_empty() {
        let p: Probe = serde_json::from_value(json!({"s": null, "o": "  "})).unwrap();
        assert_eq!(p.s, "");
        assert_eq!(p.o, None);
    }

    #[test]
    fn test_number_as_string() {
        let p: Probe = serde_json::from_value(json!({"s": 24.75})).unwrap();
        assert_eq!(p.s, "24.75");
    }

    #[test]
    fn test_single_string_list() {
        let p: Probe = serde_json::from_value(json!({"l": "Loch Ness Green"})).unwrap();
        assert_eq!(p.l, vec!["Loch Ness Green"]);
    }

    #[test]
    fn test_list_drops_blanks() {
        let p: Probe = serde_json::from_value(json!({"l": ["a", "", null, 3]})).unwrap();
        assert_eq!(p.l, vec!["a", "3"]);
    }

    #[test]
    fn test_missing_fields_default() {
        let p: Probe = serde_json::from_value(json!({})).unwrap();
        assert!(p.s.is_empty());
        assert!(p.o.is_none());
        assert!(p.y.is_none());
        assert!(p.l.is_empty());
    }
}
