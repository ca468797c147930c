//! Deduplication fingerprints for instrument identities.
//!
//! The fingerprint is a normalized `brand|model|year` key used to spot likely
//! duplicates downstream. It is not a uniqueness constraint.

use crate::defaults::UNKNOWN;
use crate::models::identity::InstrumentIdentity;

/// Derive the fingerprint for an identity.
///
/// Each component is trimmed and lowercased; a missing or blank component
/// becomes `unknown`. `year` takes precedence over `year_range`. A `|` or `\`
/// inside a component is backslash-escaped so distinct identities never
/// share a key.
pub fn dedup_fingerprint(identity: &InstrumentIdentity) -> String {
    let year = match identity.year {
        Some(y) => y.to_string(),
        None => component(identity.year_range.as_deref()),
    };
    format!(
        "{}|{}|{}",
        component(Some(&identity.brand)),
        component(Some(&identity.model)),
        year
    )
}

fn component(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(s) if !s.is_empty() => escape(&s.to_lowercase()),
        _ => UNKNOWN.to_string(),
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '|' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
