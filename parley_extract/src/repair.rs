//! Locating and repairing the JSON object inside a reply.

use regex::Regex;
use serde_json::Value;
use std::ops::Range;
use std::sync::OnceLock;

static BARE_KEY_PATTERN: OnceLock<Regex> = OnceLock::new();

/// An unquoted identifier in key position: after `{` or `,`, before `:`.
#[expect(
    clippy::expect_used,
    reason = "Static regex pattern validated at compile time"
)]
fn bare_key_pattern() -> &'static Regex {
    BARE_KEY_PATTERN.get_or_init(|| {
        Regex::new(r"([{,]\s*)([A-Za-z_][A-Za-z0-9_\-]*)(\s*:)")
            .expect("Static regex pattern is guaranteed to be valid")
    })
}

/// Byte range from the first `{` to the last `}`, inclusive.
///
/// Greedy: two separate objects in one reply produce a span that
/// covers both, and a stray brace in prose widens the span.
#[must_use]
pub fn find_object_span(text: &str) -> Option<Range<usize>> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then_some(start..end + 1)
}

/// Parse text as JSON, accepting only an object at the top level.
#[must_use]
pub fn parse_object(text: &str) -> Option<Value> {
    serde_json::from_str::<Value>(text.trim())
        .ok()
        .filter(Value::is_object)
}

/// Parse a whole reply as structured data.
///
/// Any JSON value is accepted as long as the text has a brace region, so an
/// array of objects qualifies while bare scalars and brace-free arrays do not.
#[must_use]
pub fn parse_structured(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    find_object_span(trimmed)?;
    serde_json::from_str::<Value>(trimmed).ok()
}

/// Quote bare keys, then turn single quotes into double quotes.
///
/// Apostrophes inside string values are rewritten too, so text such as
/// `{'note': 'don't'}` stays unparseable.
#[must_use]
pub fn repair_quotes(candidate: &str) -> String {
    let keyed = bare_key_pattern().replace_all(candidate, "${1}\"${2}\"${3}");
    keyed.replace('\'', "\"")
}
