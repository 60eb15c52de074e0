//! Caller-configurable policies for the conversation pipeline.

use serde::{Deserialize, Serialize};

/// What `clear` does with the steering context.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClearPolicy {
    #[default]
    KeepContext,
    ClearContext,
}

/// Which strategy decides between free text and structured output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "strategy", content = "patterns", rename_all = "snake_case")]
pub enum DecisionPolicy {
    /// Every question asks for structured output
    #[default]
    Always,
    /// Every question is answered as free text
    Never,
    /// Structured output only when a pattern matches the question
    Keywords(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_policy_serde_shape() {
        let policy: DecisionPolicy =
            serde_json::from_str(r#"{"strategy": "keywords", "patterns": ["json", "list"]}"#)
                .unwrap_or_default();
        assert_eq!(
            policy,
            DecisionPolicy::Keywords(vec!["json".to_string(), "list".to_string()])
        );

        let policy: DecisionPolicy =
            serde_json::from_str(r#"{"strategy": "never"}"#).unwrap_or_default();
        assert_eq!(policy, DecisionPolicy::Never);
    }

    #[test]
    fn clear_policy_defaults_to_keeping_context() {
        assert_eq!(ClearPolicy::default(), ClearPolicy::KeepContext);
        let policy: ClearPolicy = serde_json::from_str(r#""clear_context""#).unwrap_or_default();
        assert_eq!(policy, ClearPolicy::ClearContext);
    }
}
