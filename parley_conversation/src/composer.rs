//! Request composition for the next model call.

use parley_core::{HistoryEntry, OutputMode, Role};
use serde::Serialize;

use crate::history::{HistoryConfig, HistoryWindow};
use crate::store::ConversationState;

/// Instruction appended to a question answered as structured output.
pub const STRUCTURED_INSTRUCTION: &str = "Respond with a single valid JSON object only. \
Use double quotes for all keys and string values. \
Do not add any prose before or after the object and do not wrap it in code fences. \
Example shape: {\"answer\": \"...\", \"key_points\": [\"...\", \"...\"]}";

/// Acknowledgment used as the assistant half of the context priming pair.
pub const CONTEXT_ACKNOWLEDGMENT: &str =
    "Understood. I will take this context into account in my responses.";

/// Everything sent to the model for one turn, apart from the model name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptPayload {
    pub history: Vec<HistoryEntry>,
    pub prompt_text: String,
}

/// Builds prompts from conversation state. Never mutates the state.
#[derive(Debug, Clone, Default)]
pub struct RequestComposer {
    window: HistoryWindow,
}

impl RequestComposer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            window: HistoryWindow::with_config(HistoryConfig {
                max_turns: None,
                max_chars: None,
            }),
        }
    }

    #[must_use]
    pub const fn with_history_config(mut self, config: HistoryConfig) -> Self {
        self.window = HistoryWindow::with_config(config);
        self
    }

    #[must_use]
    pub fn build_prompt(
        &self,
        state: &ConversationState,
        question: &str,
        mode: OutputMode,
    ) -> PromptPayload {
        let mut history = context_priming(state.context());
        history.extend_from_slice(self.window.select(state.derived_history()));

        let prompt_text = match mode {
            OutputMode::Structured => format!("{question}\n\n{STRUCTURED_INSTRUCTION}"),
            OutputMode::FreeText => question.to_string(),
        };

        PromptPayload {
            history,
            prompt_text,
        }
    }
}

/// Synthetic user/assistant exchange carrying the steering context.
fn context_priming(context: &str) -> Vec<HistoryEntry> {
    let context = context.trim();
    if context.is_empty() {
        return Vec::new();
    }
    vec![
        HistoryEntry::text(
            Role::User,
            format!("This is context for your response: {context}"),
        ),
        HistoryEntry::text(Role::Assistant, CONTEXT_ACKNOWLEDGMENT),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ConversationStore;

    #[test]
    fn test_free_text_passes_question_through() {
        let store = ConversationStore::new();
        let payload =
            RequestComposer::new().build_prompt(store.snapshot(), "Tell me a joke", OutputMode::FreeText);

        assert!(payload.history.is_empty());
        assert_eq!(payload.prompt_text, "Tell me a joke");
    }

    #[test]
    fn test_structured_appends_instruction() {
        let store = ConversationStore::new();
        let payload = RequestComposer::new().build_prompt(
            store.snapshot(),
            "List three colors.",
            OutputMode::Structured,
        );

        assert!(payload.prompt_text.starts_with("List three colors."));
        assert!(payload.prompt_text.ends_with(STRUCTURED_INSTRUCTION));
        assert!(payload.prompt_text.contains("single valid JSON object"));
    }

    #[test]
    fn test_context_primes_before_history() {
        let mut store = ConversationStore::new().with_context("Answer like a pirate.");
        store.append_turn("Hi", "Ahoy!", None).ok();
        let before = store.snapshot().clone();

        let payload =
            RequestComposer::new().build_prompt(store.snapshot(), "Where?", OutputMode::FreeText);

        assert_eq!(payload.history.len(), 4);
        assert_eq!(payload.history[0].role, Role::User);
        assert!(payload.history[0].parts[0].text.contains("Answer like a pirate."));
        assert_eq!(payload.history[1].role, Role::Assistant);
        assert_eq!(payload.history[2].parts[0].text, "Hi");
        assert_eq!(payload.history[3].parts[0].text, "Ahoy!");

        let after = store.snapshot();
        assert_eq!(after.derived_history(), before.derived_history());
        assert_eq!(after.messages(), before.messages());
    }

    #[test]
    fn test_blank_context_adds_no_priming() {
        let store = ConversationStore::new().with_context("   \n");
        let payload = RequestComposer::new().build_prompt(store.snapshot(), "q", OutputMode::FreeText);
        assert!(payload.history.is_empty());
    }

    #[test]
    fn test_history_window_applies_after_priming() {
        let mut store = ConversationStore::new().with_context("ctx");
        for i in 0..5 {
            store.append_turn(&format!("q{i}"), &format!("a{i}"), None).ok();
        }

        let composer =
            RequestComposer::new().with_history_config(HistoryConfig::default().with_max_turns(1));
        let payload = composer.build_prompt(store.snapshot(), "next", OutputMode::FreeText);

        assert_eq!(payload.history.len(), 4);
        assert_eq!(payload.history[2].parts[0].text, "q4");
    }
}
