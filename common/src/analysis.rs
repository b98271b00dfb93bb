use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::prices::parse_price;

/// Structured result of reading a vision model's chart analysis.
///
/// Every field is optional: the upstream output is free text and any
/// subset of these keys may be missing or malformed. Keys this crate
/// does not know about are kept in `extra` so the response layer can
/// echo the model's full analysis back to clients.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct AnalysisRecord {
    #[serde(
        default,
        deserialize_with = "price_token",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_price: Option<String>,
    /// Model's own reading of the chart's visible axis bounds. When
    /// both parse and order correctly they are taken as ground truth.
    #[serde(
        default,
        deserialize_with = "price_token",
        skip_serializing_if = "Option::is_none"
    )]
    pub chart_min_price: Option<String>,
    #[serde(
        default,
        deserialize_with = "price_token",
        skip_serializing_if = "Option::is_none"
    )]
    pub chart_max_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<PriceLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<PriceLevel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub take_profits: Vec<PriceLevel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub support_levels: Vec<PriceLevel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resistance_levels: Vec<PriceLevel>,
    /// `Some(false)` marks a record the extractor could not parse;
    /// `raw_text` then holds the original model output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AnalysisRecord {
    /// Wrapper record for model output with no parsable JSON.
    pub fn from_raw_text(text: &str) -> Self {
        AnalysisRecord {
            raw_text: Some(text.to_string()),
            parsed: Some(false),
            ..Default::default()
        }
    }

    /// True when at least one field could place a mark on the chart.
    pub fn has_price_data(&self) -> bool {
        self.entry.is_some()
            || self.stop_loss.is_some()
            || !self.take_profits.is_empty()
            || !self.support_levels.is_empty()
            || !self.resistance_levels.is_empty()
            || self.current_price.is_some()
    }
}

/// One price mark (entry, stop, take-profit, support or resistance).
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct PriceLevel {
    #[serde(
        default,
        deserialize_with = "price_token",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PriceLevel {
    pub fn from_token(token: &str) -> Self {
        PriceLevel {
            price: Some(token.to_string()),
            ..Default::default()
        }
    }

    pub fn parsed_price(&self) -> Option<f64> {
        self.price.as_deref().and_then(parse_price)
    }
}

// Models emit prices as strings or bare numbers, depending on mood.
// Anything else reads as absent rather than failing the record.
fn price_token<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}
