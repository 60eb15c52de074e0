use parley_core::StructuredSummary;
use serde_json::Value;
use tracing::debug;

use crate::clean::{clean_display, is_blank_or_punctuation, non_whitespace_len, strip_fences};
use crate::repair::{find_object_span, parse_object, parse_structured, repair_quotes};

/// Shown instead of the raw JSON when a reply parsed as structured data.
pub const PLACEHOLDER: &str =
    "The response was returned as structured data. See the structured output for details.";

/// Minimum non-whitespace characters an unparsed reply needs to be shown as-is.
const MIN_FALLBACK_CHARS: usize = 3;

/// Which step of the fallback chain produced the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionLayer {
    Direct,
    Embedded,
    Repaired,
    Fallback,
}

impl ExtractionLayer {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Embedded => "embedded",
            Self::Repaired => "repaired",
            Self::Fallback => "fallback",
        }
    }
}

/// Display text and structured summary recovered from one reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub display_text: String,
    pub summary: StructuredSummary,
    pub layer: ExtractionLayer,
}

impl Extraction {
    #[must_use]
    pub fn into_parts(self) -> (String, StructuredSummary) {
        (self.display_text, self.summary)
    }
}

/// Split a raw model reply into display text and a structured summary.
///
/// Never fails: when no layer can parse an object, the summary carries
/// `ok = false` and the reply's cleaned text is shown instead.
#[must_use]
pub fn extract(raw_text: &str) -> Extraction {
    let unfenced = strip_fences(raw_text);

    if let Some(payload) = parse_structured(&unfenced) {
        debug!("Parsed reply directly as JSON");
        return Extraction {
            display_text: PLACEHOLDER.to_string(),
            summary: StructuredSummary::parsed(payload),
            layer: ExtractionLayer::Direct,
        };
    }

    let Some(span) = find_object_span(raw_text) else {
        debug!("No brace-delimited region in reply");
        return fallback(raw_text, unfenced.trim());
    };
    let candidate = &raw_text[span.clone()];

    if let Some(payload) = parse_object(candidate) {
        debug!("Parsed embedded JSON object at {span:?}");
        return with_remainder(raw_text, &span, payload, ExtractionLayer::Embedded);
    }

    if let Some(payload) = parse_object(&repair_quotes(candidate)) {
        debug!("Parsed embedded JSON object after quote repair");
        return with_remainder(raw_text, &span, payload, ExtractionLayer::Repaired);
    }

    debug!("All parse attempts failed, falling back to plain text");
    fallback(raw_text, candidate)
}

fn with_remainder(
    raw_text: &str,
    span: &std::ops::Range<usize>,
    payload: Value,
    layer: ExtractionLayer,
) -> Extraction {
    let remainder = format!("{}{}", &raw_text[..span.start], &raw_text[span.end..]);
    let cleaned = clean_display(&remainder);
    let display_text = if is_blank_or_punctuation(&cleaned) {
        PLACEHOLDER.to_string()
    } else {
        cleaned
    };

    Extraction {
        display_text,
        summary: StructuredSummary::parsed(payload),
        layer,
    }
}

fn fallback(raw_text: &str, candidate: &str) -> Extraction {
    let cleaned = clean_display(raw_text);
    let display_text = if non_whitespace_len(&cleaned) >= MIN_FALLBACK_CHARS {
        cleaned
    } else {
        PLACEHOLDER.to_string()
    };

    Extraction {
        display_text,
        summary: StructuredSummary::failed(candidate),
        layer: ExtractionLayer::Fallback,
    }
}
