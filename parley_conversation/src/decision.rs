//! Strategies deciding whether a question is answered as structured output.

use parley_core::{DecisionPolicy, OutputMode};
use regex::{Regex, RegexBuilder};
use tracing::debug;

/// Classifies a question as needing structured or free-text output.
///
/// Implementations must be deterministic for a given question and context.
pub trait StructuredOutputDecision: Send + Sync {
    fn needs_structured_output(&self, question: &str, context: &str) -> OutputMode;
}

/// Every question is answered as structured output.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysStructured;

impl StructuredOutputDecision for AlwaysStructured {
    fn needs_structured_output(&self, _question: &str, _context: &str) -> OutputMode {
        OutputMode::Structured
    }
}

/// Every question is answered as free text.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysFreeText;

impl StructuredOutputDecision for AlwaysFreeText {
    fn needs_structured_output(&self, _question: &str, _context: &str) -> OutputMode {
        OutputMode::FreeText
    }
}

#[derive(Debug, Clone)]
enum Matcher {
    Regex(Regex),
    Contains(String),
}

impl Matcher {
    fn new(pattern: &str) -> Self {
        // Patterns with regex syntax are compiled; anything else is a plain substring.
        let looks_like_regex = pattern.contains("(?i)")
            || pattern.contains('(')
            || pattern.contains('|')
            || pattern.contains('\\');
        if looks_like_regex {
            match RegexBuilder::new(pattern).case_insensitive(true).build() {
                Ok(re) => return Self::Regex(re),
                Err(e) => debug!("Pattern {pattern:?} is not a valid regex ({e}), matching literally"),
            }
        }
        Self::Contains(pattern.to_lowercase())
    }

    fn is_match(&self, lower: &str) -> bool {
        match self {
            Self::Regex(re) => re.is_match(lower),
            Self::Contains(needle) => lower.contains(needle.as_str()),
        }
    }
}

/// Structured output when any pattern matches the lowercased question.
#[derive(Debug, Clone)]
pub struct KeywordDecision {
    matchers: Vec<Matcher>,
}

impl KeywordDecision {
    #[must_use]
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        Self {
            matchers: patterns
                .iter()
                .map(|p| p.as_ref().trim())
                .filter(|p| !p.is_empty())
                .map(Matcher::new)
                .collect(),
        }
    }
}

impl Default for KeywordDecision {
    fn default() -> Self {
        Self::new(&default_patterns())
    }
}

impl StructuredOutputDecision for KeywordDecision {
    fn needs_structured_output(&self, question: &str, _context: &str) -> OutputMode {
        let lower = question.to_lowercase();
        if self.matchers.iter().any(|m| m.is_match(&lower)) {
            OutputMode::Structured
        } else {
            OutputMode::FreeText
        }
    }
}

/// Default keyword patterns for structured requests.
#[must_use]
pub fn default_patterns() -> Vec<String> {
    vec![
        r"(?i)\b(json|table|list|summari[sz]e|compare|extract|key points)\b".to_string(),
        r"(?i)\b(how many|which ones|give me \d+)\b".to_string(),
    ]
}

/// Build the strategy selected by a policy.
#[must_use]
pub fn from_policy(policy: &DecisionPolicy) -> Box<dyn StructuredOutputDecision> {
    match policy {
        DecisionPolicy::Always => Box::new(AlwaysStructured),
        DecisionPolicy::Never => Box::new(AlwaysFreeText),
        DecisionPolicy::Keywords(patterns) if patterns.is_empty() => {
            Box::new(KeywordDecision::default())
        }
        DecisionPolicy::Keywords(patterns) => Box::new(KeywordDecision::new(patterns)),
    }
}
