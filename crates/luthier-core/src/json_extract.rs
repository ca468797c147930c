//! Recovery of a JSON object from free-text model replies.
//!
//! Models wrap their JSON in prose, markdown fences, or both. The extractor
//! tries progressively looser strategies and reports which one succeeded:
//!
//! 1. the whole (trimmed) reply;
//! 2. each fenced code block (```` ```json ```` or bare ```` ``` ````);
//! 3. each balanced `{...}` span, scanned left to right.
//!
//! Only JSON **objects** are accepted. Arrays and scalars are skipped so a
//! stray `[1, 2]` in the prose never masquerades as a result.

use serde_json::Value;

use crate::error::{Error, Result};

/// Which strategy recovered the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// The whole reply parsed as an object.
    Direct,
    /// A fenced code block parsed as an object.
    Fenced,
    /// A balanced brace span parsed as an object.
    BraceSpan,
}

impl ExtractionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStrategy::Direct => "direct",
            ExtractionStrategy::Fenced => "fenced",
            ExtractionStrategy::BraceSpan => "brace_span",
        }
    }
}

impl std::fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extract the first JSON object from `text`.
///
/// Returns [`Error::UnparseableOutput`] when every strategy fails.
pub fn extract_json_object(text: &str) -> Result<(Value, ExtractionStrategy)> {
    let trimmed = text.trim();

    if let Some(obj) = parse_object(trimmed) {
        return Ok((obj, ExtractionStrategy::Direct));
    }

    for block in fenced_blocks(trimmed) {
        if let Some(obj) = parse_object(block) {
            return Ok((obj, ExtractionStrategy::Fenced));
        }
    }

    for span in brace_spans(trimmed) {
        if let Some(obj) = parse_object(span) {
            return Ok((obj, ExtractionStrategy::BraceSpan));
        }
    }

    Err(Error::UnparseableOutput(preview(trimmed)))
}

/// Extract and deserialize in one step.
pub fn extract_json_as<T: serde::de::DeserializeOwned>(
    text: &str,
) -> Result<(T, ExtractionStrategy)> {
    let (value, strategy) = extract_json_object(text)?;
    let parsed = serde_json::from_value(value)
        .map_err(|e| Error::UnparseableOutput(format!("unexpected shape: {}", e)))?;
    Ok((parsed, strategy))
}

fn parse_object(candidate: &str) -> Option<Value> {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(candidate) {
        Ok(v @ Value::Object(_)) => Some(v),
        _ => None,
    }
}

/// Contents of every ``` fenced block, in order. The optional language tag on
/// the opening fence line is dropped.
fn fenced_blocks(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find("```") {
        let after_fence = &rest[open + 3..];
        // Skip the info string (e.g. "json") up to the end of the fence line.
        let body_start = match after_fence.find('\n') {
            Some(nl) if !after_fence[..nl].contains('{') => nl + 1,
            _ => after_fence
                .find(|c: char| !c.is_ascii_alphanumeric())
                .unwrap_or(after_fence.len()),
        };
        let body = &after_fence[body_start..];
        match body.find("```") {
            Some(close) => {
                blocks.push(&body[..close]);
                rest = &body[close + 3..];
            }
            None => break,
        }
    }

    blocks
}

/// Every top-level balanced `{...}` span. Braces inside JSON strings (and
/// escaped quotes within them) do not affect nesting depth.
fn brace_spans(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut start = 0;

    while let Some(offset) = text[start..].find('{') {
        let open = start + offset;
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        let mut close = None;

        for (i, &b) in bytes.iter().enumerate().skip(open) {
            if in_string {
                if escaped {
                    escaped = false;
                } else if b == b'\\' {
                    escaped = true;
                } else if b == b'"' {
                    in_string = false;
                }
                continue;
            }
            match b {
                b'"' => in_string = true,
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }

        match close {
            Some(end) => {
                spans.push(&text[open..=end]);
                // A span that fails to parse may still contain a valid nested
                // object, so resume scanning just past the opening brace.
                start = open + 1;
            }
            None => {
                start = open + 1;
            }
        }
    }

    spans
}

fn preview(text: &str) -> String {
    const MAX: usize = 120;
    if text.is_empty() {
        return "empty reply".to_string();
    }
    let mut end = text.len().min(MAX);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    if end < text.len() {
        format!("no JSON object in reply: {}...", &text[..end])
    } else {
        format!("no JSON object in reply: {}", text)
    }
}
