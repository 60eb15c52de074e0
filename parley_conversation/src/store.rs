//! Session-scoped conversation state.
//!
//! A store owns the message log of one conversation, the steering context,
//! the derived history sent with the next request and the structured
//! summaries of structured-output turns.

use chrono::{DateTime, Utc};
use parley_core::{
    ClearPolicy, HistoryEntry, Message, Role, StructuredSummary, ValidationError,
};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::history::HistoryFormatter;

/// Read-only view of a conversation.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationState {
    /// Session identifier
    pub id: Uuid,
    messages: Vec<Message>,
    context: String,
    derived_history: Vec<HistoryEntry>,
    structured_summaries: Vec<StructuredSummary>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl ConversationState {
    fn new(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            messages: Vec::new(),
            context: String::new(),
            derived_history: Vec::new(),
            structured_summaries: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    #[must_use]
    pub fn derived_history(&self) -> &[HistoryEntry] {
        &self.derived_history
    }

    #[must_use]
    pub fn structured_summaries(&self) -> &[StructuredSummary] {
        &self.structured_summaries
    }

    #[must_use]
    pub const fn message_count(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub const fn turn_count(&self) -> usize {
        self.messages.len() / 2
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Owner of one conversation's state.
///
/// Every mutation takes `&mut self`, so turns against one store are
/// serialised by the borrow checker.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    state: ConversationState,
    clear_policy: ClearPolicy,
}

impl ConversationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_id(Uuid::now_v7())
    }

    #[must_use]
    pub fn with_id(id: Uuid) -> Self {
        Self {
            state: ConversationState::new(id),
            clear_policy: ClearPolicy::default(),
        }
    }

    #[must_use]
    pub const fn with_clear_policy(mut self, policy: ClearPolicy) -> Self {
        self.clear_policy = policy;
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.state.context = context.into();
        self
    }

    /// Append one completed turn.
    ///
    /// Both texts are validated before anything changes, so the store either
    /// gains two messages (and the summary, if any) or stays as it was.
    pub fn append_turn(
        &mut self,
        user_text: &str,
        assistant_text: &str,
        summary: Option<StructuredSummary>,
    ) -> Result<(), ValidationError> {
        validate_text(Role::User, user_text)?;
        validate_text(Role::Assistant, assistant_text)?;

        self.state.messages.push(Message::new(Role::User, user_text));
        self.state
            .messages
            .push(Message::new(Role::Assistant, assistant_text));
        if let Some(summary) = summary {
            self.state.structured_summaries.push(summary);
        }
        self.refresh();

        debug!(
            "Session {} now has {} messages",
            self.state.id,
            self.state.messages.len()
        );
        Ok(())
    }

    /// Append a turn whose structured payload still has to be serialised.
    ///
    /// A payload that fails to serialise is logged and dropped; the text turn
    /// is committed regardless. Returns whether a summary was recorded.
    pub fn append_turn_with_payload<T: Serialize + ?Sized>(
        &mut self,
        user_text: &str,
        assistant_text: &str,
        payload: &T,
    ) -> Result<bool, ValidationError> {
        let summary = match StructuredSummary::from_payload(payload) {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!("Dropping structured summary for session {}: {e}", self.state.id);
                None
            }
        };
        let recorded = summary.is_some();
        self.append_turn(user_text, assistant_text, summary)?;
        Ok(recorded)
    }

    /// Remove all turns and summaries. The context follows the clear policy.
    pub fn clear(&mut self) {
        self.state.messages.clear();
        self.state.structured_summaries.clear();
        if self.clear_policy == ClearPolicy::ClearContext {
            self.state.context.clear();
        }
        self.refresh();
    }

    /// Replace the steering context wholesale.
    pub fn set_context(&mut self, context: impl Into<String>) {
        self.state.context = context.into();
        self.state.updated_at = Utc::now();
    }

    #[must_use]
    pub const fn snapshot(&self) -> &ConversationState {
        &self.state
    }

    #[must_use]
    pub const fn clear_policy(&self) -> ClearPolicy {
        self.clear_policy
    }

    fn refresh(&mut self) {
        self.state.derived_history = HistoryFormatter::rebuild(&self.state.messages);
        self.state.updated_at = Utc::now();
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_text(role: Role, text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyText { role });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_append_turn() {
        let mut store = ConversationStore::new();
        assert!(store.snapshot().is_empty());

        let result = store.append_turn("Hello", "Hi there!", None);
        assert!(result.is_ok());

        let state = store.snapshot();
        assert_eq!(state.message_count(), 2);
        assert_eq!(state.turn_count(), 1);
        assert_eq!(state.messages()[0].role(), Role::User);
        assert_eq!(state.messages()[1].text(), "Hi there!");
        assert_eq!(state.derived_history().len(), 2);
        assert!(state.structured_summaries().is_empty());
    }

    #[test]
    fn test_invalid_turn_leaves_store_unchanged() {
        let mut store = ConversationStore::new();
        store.append_turn("first", "reply", None).ok();

        let err = store.append_turn("second", "   ", Some(StructuredSummary::parsed(json!({}))));
        assert_eq!(err, Err(ValidationError::EmptyText { role: Role::Assistant }));

        let err = store.append_turn("", "reply", None);
        assert_eq!(err, Err(ValidationError::EmptyText { role: Role::User }));

        let state = store.snapshot();
        assert_eq!(state.message_count(), 2);
        assert_eq!(state.derived_history().len(), 2);
        assert!(state.structured_summaries().is_empty());
    }

    #[test]
    fn test_summary_fault_still_commits_text() {
        let mut store = ConversationStore::new();
        store.append_turn("q1", "a1", None).ok();
        let before = store.snapshot().message_count();

        let mut unserialisable = HashMap::new();
        unserialisable.insert((1, 2), "tuple keys are not valid JSON object keys");

        let recorded = store.append_turn_with_payload("q2", "a2", &unserialisable);

        assert_eq!(recorded, Ok(false));
        let state = store.snapshot();
        assert_eq!(state.message_count(), before + 2);
        assert_eq!(state.messages()[2].text(), "q2");
        assert_eq!(state.messages()[3].text(), "a2");
        assert!(state.structured_summaries().is_empty());
        assert_eq!(state.derived_history().len(), state.message_count());
    }

    #[test]
    fn test_payload_is_recorded() {
        let mut store = ConversationStore::new();
        let recorded = store.append_turn_with_payload("q", "a", &json!({"k": [1, 2]}));
        assert_eq!(recorded, Ok(true));
        assert_eq!(store.snapshot().structured_summaries().len(), 1);
        assert!(store.snapshot().structured_summaries()[0].ok);
    }

    #[test]
    fn test_clear_keeps_context_by_default() {
        let mut store = ConversationStore::new().with_context("You are a travel guide.");
        store
            .append_turn("q", "a", Some(StructuredSummary::parsed(json!({"a": 1}))))
            .ok();

        store.clear();

        let state = store.snapshot();
        assert!(state.messages().is_empty());
        assert!(state.derived_history().is_empty());
        assert!(state.structured_summaries().is_empty());
        assert_eq!(state.context(), "You are a travel guide.");
    }

    #[test]
    fn test_clear_can_drop_context() {
        let mut store = ConversationStore::new()
            .with_clear_policy(ClearPolicy::ClearContext)
            .with_context("ctx");
        store.append_turn("q", "a", None).ok();

        store.clear();

        assert!(store.snapshot().is_empty());
        assert!(store.snapshot().context().is_empty());
    }

    #[test]
    fn test_set_context_replaces_wholesale() {
        let mut store = ConversationStore::new().with_context("old context");
        store.set_context("new");
        assert_eq!(store.snapshot().context(), "new");
    }

    #[test]
    fn test_derived_history_tracks_messages() {
        let mut store = ConversationStore::new();
        for i in 0..3 {
            store.append_turn(&format!("q{i}"), &format!("a{i}"), None).ok();
            let state = store.snapshot();
            assert_eq!(state.message_count() % 2, 0);
            assert_eq!(state.derived_history().len(), state.message_count());
            for (entry, message) in state.derived_history().iter().zip(state.messages()) {
                assert_eq!(entry.role, message.role());
            }
        }
    }
}
