//! Conversation history formatting.
//!
//! The flat message log is projected into role/parts entries for the next
//! request. A window can limit how much of that history is sent.

use parley_core::{HistoryEntry, Message, Role};

/// Rebuilds the derived history from the message log.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryFormatter;

impl HistoryFormatter {
    /// Project messages into role/parts entries, one entry per message.
    ///
    /// Messages are appended in user/assistant pairs, so a well-formed log
    /// alternates roles starting with the user.
    #[must_use]
    pub fn rebuild(messages: &[Message]) -> Vec<HistoryEntry> {
        debug_assert!(
            messages
                .iter()
                .enumerate()
                .all(|(i, m)| m.role() == Role::for_position(i)),
            "message log is not in user/assistant pairs"
        );
        messages.iter().map(HistoryEntry::from).collect()
    }
}

/// Limits on how much derived history goes into a request.
#[derive(Debug, Clone, Default)]
pub struct HistoryConfig {
    /// Maximum number of most recent turns to keep
    pub max_turns: Option<usize>,
    /// Maximum characters across the kept entries (approximate token limit)
    pub max_chars: Option<usize>,
}

impl HistoryConfig {
    #[must_use]
    pub const fn with_max_turns(mut self, max: usize) -> Self {
        self.max_turns = Some(max);
        self
    }

    #[must_use]
    pub const fn with_max_chars(mut self, max: usize) -> Self {
        self.max_chars = Some(max);
        self
    }
}

/// A sliding window over derived history.
///
/// Entries are dropped oldest first, always a whole turn at a time, so the
/// selected history still starts with a user entry.
#[derive(Debug, Clone, Default)]
pub struct HistoryWindow {
    config: HistoryConfig,
}

impl HistoryWindow {
    #[must_use]
    pub const fn with_config(config: HistoryConfig) -> Self {
        Self { config }
    }

    /// Select the entries to include in the next request.
    #[must_use]
    pub fn select<'a>(&self, history: &'a [HistoryEntry]) -> &'a [HistoryEntry] {
        let mut start = self.config.max_turns.map_or(0, |turns| {
            history.len().saturating_sub(turns.saturating_mul(2))
        });

        if let Some(max_chars) = self.config.max_chars {
            let mut total: usize = history[start..].iter().map(entry_chars).sum();
            while start < history.len() && total > max_chars {
                let end = (start + 2).min(history.len());
                total -= history[start..end].iter().map(entry_chars).sum::<usize>();
                start = end;
            }
        }

        &history[start..]
    }

    #[must_use]
    pub const fn config(&self) -> &HistoryConfig {
        &self.config
    }
}

fn entry_chars(entry: &HistoryEntry) -> usize {
    entry.parts.iter().map(|p| p.text.chars().count()).sum()
}

/// Statistics about the message log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryStats {
    pub total_messages: usize,
    pub user_messages: usize,
    pub assistant_messages: usize,
    pub total_characters: usize,
    pub estimated_tokens: usize,
}

impl HistoryStats {
    #[must_use]
    pub fn collect(messages: &[Message]) -> Self {
        let total_chars: usize = messages.iter().map(|m| m.text().chars().count()).sum();
        let user_count = messages.iter().filter(|m| m.role() == Role::User).count();

        Self {
            total_messages: messages.len(),
            user_messages: user_count,
            assistant_messages: messages.len() - user_count,
            total_characters: total_chars,
            estimated_tokens: total_chars / 4, // Rough estimate: 4 chars per token
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_messages(count: usize) -> Vec<Message> {
        (0..count)
            .map(|i| Message::new(Role::for_position(i), format!("Message {i}: {}", "x".repeat(90))))
            .collect()
    }

    #[test]
    fn test_rebuild_projects_roles() {
        let messages = create_test_messages(4);
        let history = HistoryFormatter::rebuild(&messages);

        assert_eq!(history.len(), messages.len());
        for (entry, message) in history.iter().zip(&messages) {
            assert_eq!(entry.role, message.role());
            assert_eq!(entry.parts.len(), 1);
            assert_eq!(entry.parts[0].text, message.text());
        }
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let messages = create_test_messages(6);
        let first = HistoryFormatter::rebuild(&messages);
        let second = HistoryFormatter::rebuild(&messages);
        assert_eq!(first, second);
        assert!(HistoryFormatter::rebuild(&[]).is_empty());
    }

    #[test]
    fn test_window_keeps_recent_turns() {
        let history = HistoryFormatter::rebuild(&create_test_messages(20));
        let window = HistoryWindow::with_config(HistoryConfig::default().with_max_turns(2));

        let selected = window.select(&history);

        assert_eq!(selected.len(), 4);
        assert_eq!(selected[0].role, Role::User);
        assert_eq!(selected[0].parts[0].text, history[16].parts[0].text);
    }

    #[test]
    fn test_window_char_limit_drops_whole_turns() {
        let history = HistoryFormatter::rebuild(&create_test_messages(10));
        let window = HistoryWindow::with_config(HistoryConfig::default().with_max_chars(500));

        let selected = window.select(&history);

        let total: usize = selected.iter().map(entry_chars).sum();
        assert!(total <= 500);
        assert_eq!(selected.len() % 2, 0);
        assert_eq!(selected.first().map(|e| e.role), Some(Role::User));
    }

    #[test]
    fn test_default_window_keeps_everything() {
        let history = HistoryFormatter::rebuild(&create_test_messages(8));
        assert_eq!(HistoryWindow::default().select(&history).len(), 8);
    }

    #[test]
    fn test_history_stats() {
        let stats = HistoryStats::collect(&create_test_messages(10));

        assert_eq!(stats.total_messages, 10);
        assert_eq!(stats.user_messages, 5);
        assert_eq!(stats.assistant_messages, 5);
        assert!(stats.estimated_tokens > 0);
    }
}
