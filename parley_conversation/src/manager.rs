//! Conversation manager for multi-turn dialogue.
//!
//! The `ConversationManager` runs one turn at a time: decide the output
//! mode, compose the request, call the provider, extract the reply and
//! commit the turn to the store.

use parley_core::{
    ClearPolicy, DecisionPolicy, LLMProvider, OutputMode, ProviderError, Role, StructuredSummary,
    ValidationError,
};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::composer::RequestComposer;
use crate::decision::{StructuredOutputDecision, from_policy};
use crate::history::HistoryConfig;
use crate::store::{ConversationState, ConversationStore};

/// Configuration for conversation management.
#[derive(Debug, Clone)]
pub struct ConversationConfig {
    /// Session identifier
    pub session_id: Uuid,
    /// Model to use for completions
    pub model: String,
    /// Initial steering context
    pub context: String,
    /// Most recent turns sent with each request, `None` sends all of them
    pub history_limit: Option<usize>,
    /// Character budget for the sent history, `None` for no budget
    pub history_char_budget: Option<usize>,
    pub clear_policy: ClearPolicy,
    pub decision: DecisionPolicy,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            session_id: Uuid::now_v7(),
            model: "gemini-2.0-flash".to_string(),
            context: String::new(),
            history_limit: None,
            history_char_budget: None,
            clear_policy: ClearPolicy::default(),
            decision: DecisionPolicy::default(),
        }
    }
}

impl ConversationConfig {
    #[must_use]
    pub const fn with_session_id(mut self, id: Uuid) -> Self {
        self.session_id = id;
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: String) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub const fn with_history_limit(mut self, limit: Option<usize>) -> Self {
        self.history_limit = limit;
        self
    }

    #[must_use]
    pub const fn with_history_char_budget(mut self, budget: Option<usize>) -> Self {
        self.history_char_budget = budget;
        self
    }

    #[must_use]
    pub const fn with_clear_policy(mut self, policy: ClearPolicy) -> Self {
        self.clear_policy = policy;
        self
    }

    #[must_use]
    pub fn with_decision(mut self, decision: DecisionPolicy) -> Self {
        self.decision = decision;
        self
    }
}

/// Errors surfaced to the caller of a turn.
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("invalid turn: {0}")]
    Validation(#[from] ValidationError),

    #[error("LLM provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Result of one successful turn.
#[derive(Debug, Clone)]
pub struct TurnResult {
    /// Text committed as the assistant message
    pub display_text: String,
    pub mode: OutputMode,
    /// Present for structured turns only
    pub summary: Option<StructuredSummary>,
    /// 1-based turn number
    pub turn_number: usize,
}

/// Multi-turn conversation manager.
pub struct ConversationManager<P>
where
    P: LLMProvider,
{
    provider: P,
    decision: Box<dyn StructuredOutputDecision>,
    composer: RequestComposer,
    store: ConversationStore,
    config: ConversationConfig,
}

impl<P> ConversationManager<P>
where
    P: LLMProvider,
{
    #[must_use]
    pub fn new(provider: P, config: ConversationConfig) -> Self {
        info!(
            "Creating conversation manager for session: {}",
            config.session_id
        );

        let store = ConversationStore::with_id(config.session_id)
            .with_clear_policy(config.clear_policy)
            .with_context(config.context.clone());
        let composer = RequestComposer::new().with_history_config(HistoryConfig {
            max_turns: config.history_limit,
            max_chars: config.history_char_budget,
        });

        Self {
            provider,
            decision: from_policy(&config.decision),
            composer,
            store,
            config,
        }
    }

    /// Replace the output-mode strategy.
    #[must_use]
    pub fn with_decision(mut self, decision: Box<dyn StructuredOutputDecision>) -> Self {
        self.decision = decision;
        self
    }

    /// Process a single conversation turn.
    ///
    /// A provider failure still completes the turn: an assistant message
    /// explaining the failure is committed before the error is returned, so
    /// the history stays in user/assistant pairs.
    pub async fn submit_question(
        &mut self,
        question: &str,
    ) -> Result<TurnResult, ConversationError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ValidationError::EmptyText { role: Role::User }.into());
        }

        let turn_number = self.store.snapshot().turn_count() + 1;
        let state = self.store.snapshot();
        let mode = self.decision.needs_structured_output(question, state.context());
        info!(
            "Processing turn {turn_number} for session {} as {mode:?}",
            state.id
        );

        let payload = self.composer.build_prompt(state, question, mode);
        debug!(
            "Request has {} history entries, prompt_len={}",
            payload.history.len(),
            payload.prompt_text.len()
        );

        let reply = self
            .provider
            .generate(&payload.history, &payload.prompt_text, mode, &self.config.model)
            .await
            .and_then(|raw| match mode {
                OutputMode::FreeText if raw.trim().is_empty() => {
                    Err(ProviderError::empty_response())
                }
                _ => Ok(raw),
            });

        let raw = match reply {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Turn {turn_number} failed: {e}");
                self.store
                    .append_turn(question, &provider_error_message(&e), None)?;
                return Err(e.into());
            }
        };

        let (display_text, summary) = match mode {
            OutputMode::Structured => {
                let extraction = parley_extract::extract(&raw);
                debug!(
                    "Extracted turn {turn_number} via {} layer (ok={})",
                    extraction.layer.as_str(),
                    extraction.summary.ok
                );
                let (display_text, summary) = extraction.into_parts();
                (display_text, Some(summary))
            }
            OutputMode::FreeText => (raw.trim().to_string(), None),
        };

        self.store
            .append_turn(question, &display_text, summary.clone())?;
        debug!("Turn {turn_number} completed successfully");

        Ok(TurnResult {
            display_text,
            mode,
            summary,
            turn_number,
        })
    }

    /// Remove all turns; the context follows the configured clear policy.
    pub fn clear_history(&mut self) {
        info!("Clearing history for session {}", self.config.session_id);
        self.store.clear();
    }

    pub fn set_context(&mut self, context: impl Into<String>) {
        self.store.set_context(context);
    }

    #[must_use]
    pub const fn snapshot(&self) -> &ConversationState {
        self.store.snapshot()
    }

    #[must_use]
    pub const fn config(&self) -> &ConversationConfig {
        &self.config
    }
}

/// User-readable assistant message for a failed provider call.
#[must_use]
pub fn provider_error_message(error: &ProviderError) -> String {
    format!("Sorry, I couldn't get a response: {error}")
}
