//! Instrument identities produced by the identify phase.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::lenient;

/// Production status of an instrument model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductionStatus {
    Current,
    Discontinued,
    LimitedEdition,
    CustomShop,
}

impl ProductionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductionStatus::Current => "current",
            ProductionStatus::Discontinued => "discontinued",
            ProductionStatus::LimitedEdition => "limited_edition",
            ProductionStatus::CustomShop => "custom_shop",
        }
    }

    /// Parse a model-supplied status. Spaces and hyphens are treated as
    /// underscores; anything unrecognized is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "current" => Some(ProductionStatus::Current),
            "discontinued" => Some(ProductionStatus::Discontinued),
            "limited_edition" => Some(ProductionStatus::LimitedEdition),
            "custom_shop" => Some(ProductionStatus::CustomShop),
            _ => None,
        }
    }
}

fn production_status<'de, D>(deserializer: D) -> Result<Option<ProductionStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().and_then(ProductionStatus::parse))
}

/// The kind of source text an identification ran over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Article,
    Video,
    SocialMedia,
    UserText,
    Mixed,
}

fn source_type<'de, D>(deserializer: D) -> Result<Option<SourceType>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().and_then(|s| {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        serde_json::from_value(Value::String(normalized)).ok()
    }))
}

/// One instrument found in a source text.
///
/// Created by the identify phase and consumed read-only by enrichment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstrumentIdentity {
    #[serde(default, deserialize_with = "lenient::string")]
    pub brand: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub model: String,
    #[serde(default, deserialize_with = "lenient::year")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub year_range: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub serial_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub finish: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "production_status")]
    pub production_status: Option<ProductionStatus>,
    /// The complete narrative about this instrument from the source.
    #[serde(default, deserialize_with = "lenient::string")]
    pub context: String,

    #[serde(
        rename = "_famous_owner",
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub famous_owner: Option<String>,
    #[serde(
        rename = "_nickname",
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub nickname: Option<String>,
    #[serde(
        rename = "_notable_events",
        default,
        deserialize_with = "lenient::string_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub notable_events: Vec<String>,
    #[serde(
        rename = "_ownership_history",
        default,
        deserialize_with = "lenient::string_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub ownership_history: Vec<String>,
    #[serde(
        rename = "_modification_history",
        default,
        deserialize_with = "lenient::string_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub modification_history: Vec<String>,
}

impl InstrumentIdentity {
    /// `year` if known, else `year_range`, for display in prompts.
    pub fn year_label(&self) -> String {
        match (self.year, &self.year_range) {
            (Some(y), _) => y.to_string(),
            (None, Some(r)) => r.clone(),
            (None, None) => String::new(),
        }
    }
}

/// Result of the identify phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentifyPhaseResponse {
    #[serde(default, deserialize_with = "identities")]
    pub guitars: Vec<InstrumentIdentity>,
    #[serde(default, deserialize_with = "source_type")]
    pub source_type: Option<SourceType>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub original_text: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub summary: String,
    /// Model-supplied reason when nothing was found.
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Option<String>,
}

/// `null` guitars is treated as an empty list.
fn identities<'de, D>(deserializer: D) -> Result<Vec<InstrumentIdentity>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<InstrumentIdentity>>::deserialize(deserializer)?.unwrap_or_default())
}
