//! Raw option chain payloads as delivered by the chains endpoint.
//!
//! Only the top level is typed. The put map is kept as JSON so that its
//! nested shape (expiration → strike → contract list) can be checked and
//! reported by the flattener rather than failing the whole decode. Other
//! top-level scalars are decoded leniently; fields the loader never reads
//! are not decoded at all.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Status string the API returns for a successful chain request.
pub const STATUS_SUCCESS: &str = "SUCCESS";

/// Option chain response for one underlying.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChainResponse {
    /// Underlying symbol echoed back by the API.
    #[serde(default, deserialize_with = "lenient_text")]
    pub symbol: Option<String>,

    /// "SUCCESS" or "FAILED".
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: Option<String>,

    /// Expiration-date label → strike label → list of contract objects.
    #[serde(default)]
    pub put_exp_date_map: Option<Map<String, Value>>,
}

impl RawChainResponse {
    /// Parses a response body.
    ///
    /// # Errors
    /// Returns an error if the body is not a JSON object of the expected shape.
    pub fn from_slice(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }

    /// Returns true unless the API explicitly reported a non-success status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status
            .as_deref()
            .map_or(true, |status| status == STATUS_SUCCESS)
    }
}

/// Reads a scalar as text. Numbers and booleans keep their JSON rendering;
/// null and nested values become `None` instead of failing the response.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    })
}
