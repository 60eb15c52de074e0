//! Text cleanup applied to display text.

use regex::Regex;
use std::sync::OnceLock;

static FENCE_PATTERN: OnceLock<Regex> = OnceLock::new();
static TAG_PATTERN: OnceLock<Regex> = OnceLock::new();
static BLANK_RUN_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Characters that may make up a line with no prose on it.
const BRACKET_PUNCTUATION: &[char] = &['{', '}', '[', ']', '(', ')', ',', ';'];

/// Markdown fence markers with an optional language tag.
#[expect(
    clippy::expect_used,
    reason = "Static regex pattern validated at compile time"
)]
fn fence_pattern() -> &'static Regex {
    FENCE_PATTERN.get_or_init(|| {
        Regex::new(r"```[A-Za-z0-9_+\-]*").expect("Static regex pattern is guaranteed to be valid")
    })
}

/// HTML-like tags such as `<br>`, `</div>` or `<span class="x">`.
#[expect(
    clippy::expect_used,
    reason = "Static regex pattern validated at compile time"
)]
fn tag_pattern() -> &'static Regex {
    TAG_PATTERN.get_or_init(|| {
        Regex::new(r"</?[A-Za-z][A-Za-z0-9\-]*(?:\s[^<>]*)?/?>")
            .expect("Static regex pattern is guaranteed to be valid")
    })
}

#[expect(
    clippy::expect_used,
    reason = "Static regex pattern validated at compile time"
)]
fn blank_run_pattern() -> &'static Regex {
    BLANK_RUN_PATTERN.get_or_init(|| {
        Regex::new(r"\n{3,}").expect("Static regex pattern is guaranteed to be valid")
    })
}

/// Remove every code-fence marker, including a language tag right after it.
#[must_use]
pub fn strip_fences(text: &str) -> String {
    fence_pattern().replace_all(text, "").into_owned()
}

#[must_use]
pub fn strip_tags(text: &str) -> String {
    tag_pattern().replace_all(text, "").into_owned()
}

/// True for a non-empty line made only of brackets and separators.
#[must_use]
pub fn is_bracket_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| BRACKET_PUNCTUATION.contains(&c))
}

/// Drop bracket-only lines and trailing whitespace, then collapse blank runs.
#[must_use]
pub fn drop_bracket_lines(text: &str) -> String {
    let kept = text
        .lines()
        .filter(|line| !is_bracket_line(line))
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    blank_run_pattern().replace_all(&kept, "\n\n").into_owned()
}

/// Full display cleanup: fences, tags, bracket-only lines, outer whitespace.
#[must_use]
pub fn clean_display(text: &str) -> String {
    let text = strip_fences(text);
    let text = strip_tags(&text);
    drop_bracket_lines(&text).trim().to_string()
}

/// Nothing but whitespace and punctuation left.
#[must_use]
pub fn is_blank_or_punctuation(text: &str) -> bool {
    text.chars()
        .all(|c| c.is_whitespace() || c.is_ascii_punctuation())
}

#[must_use]
pub fn non_whitespace_len(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fences_with_and_without_language_tag() {
        assert_eq!(strip_fences("```json\n{}\n```"), "\n{}\n");
        assert_eq!(strip_fences("```\nplain\n```"), "\nplain\n");
        assert_eq!(strip_fences("no fences"), "no fences");
    }

    #[test]
    fn strips_html_like_tags_only() {
        assert_eq!(strip_tags("a<br>b</p>c<span class=\"x\">d"), "abcd");
        assert_eq!(strip_tags("1 < 2 and 3 > 2"), "1 < 2 and 3 > 2");
    }

    #[test]
    fn bracket_lines_are_detected() {
        assert!(is_bracket_line("  }"));
        assert!(is_bracket_line("],"));
        assert!(!is_bracket_line(""));
        assert!(!is_bracket_line("} done"));
    }

    #[test]
    fn clean_display_removes_leftovers() {
        let text = "```json\n{\n}\n```\nHere are some colors.\n\n\n\n<br>Enjoy.";
        assert_eq!(clean_display(text), "Here are some colors.\n\nEnjoy.");
    }

    #[test]
    fn punctuation_only_text() {
        assert!(is_blank_or_punctuation(" .,;\n"));
        assert!(is_blank_or_punctuation(""));
        assert!(!is_blank_or_punctuation("ok."));
    }

    #[test]
    fn counts_non_whitespace_chars() {
        assert_eq!(non_whitespace_len(" a b\nc "), 3);
    }
}
