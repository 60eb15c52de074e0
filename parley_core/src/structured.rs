//! Structured summary attached to a structured-output turn.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Payload error text used when no parse attempt succeeded.
pub const PARSE_FAILED: &str = "parse failed";

/// Maximum characters kept from the candidate text when parsing fails.
const RAW_FRAGMENT_CHARS: usize = 100;

/// Best-effort structured result of one reply.
///
/// Consumers branch on `ok`, never on absence: a failed parse still yields
/// a summary with an error payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StructuredSummary {
    pub payload: Value,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_fragment: Option<String>,
}

impl StructuredSummary {
    #[must_use]
    pub const fn parsed(payload: Value) -> Self {
        Self {
            payload,
            ok: true,
            raw_fragment: None,
        }
    }

    /// Summary for a reply nothing could be parsed from.
    #[must_use]
    pub fn failed(candidate: &str) -> Self {
        Self {
            payload: json!({ "error": PARSE_FAILED }),
            ok: false,
            raw_fragment: Some(candidate.chars().take(RAW_FRAGMENT_CHARS).collect()),
        }
    }

    /// Build a parsed summary from any serialisable payload.
    pub fn from_payload<T: Serialize + ?Sized>(payload: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(payload).map(Self::parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn failed_summary_truncates_fragment_by_chars() {
        let candidate = "é".repeat(150);
        let summary = StructuredSummary::failed(&candidate);
        assert!(!summary.ok);
        assert_eq!(summary.payload, json!({"error": "parse failed"}));
        assert_eq!(
            summary.raw_fragment.as_deref().map(|s| s.chars().count()),
            Some(100)
        );
    }

    #[test]
    fn from_payload_rejects_non_string_map_keys() {
        let mut payload = HashMap::new();
        payload.insert((1, 2), "pair");
        assert!(StructuredSummary::from_payload(&payload).is_err());

        let summary = StructuredSummary::from_payload(&json!({"a": 1}));
        assert!(summary.is_ok_and(|s| s.ok && s.payload == json!({"a": 1})));
    }
}
