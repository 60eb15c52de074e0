#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Multi-turn conversation state and the turn pipeline.
//!
//! # Key Features
//! - Ordered user/assistant message log, appended one whole turn at a time
//! - Derived role/parts history rebuilt after every change
//! - Pluggable decision between free-text and structured output
//! - Context priming and a strict JSON instruction for structured turns
//! - Provider failures recorded as assistant turns

mod composer;
mod decision;
mod history;
mod manager;
mod store;

pub use composer::{CONTEXT_ACKNOWLEDGMENT, PromptPayload, RequestComposer, STRUCTURED_INSTRUCTION};
pub use decision::{
    AlwaysFreeText, AlwaysStructured, KeywordDecision, StructuredOutputDecision, default_patterns,
    from_policy,
};
pub use history::{HistoryConfig, HistoryFormatter, HistoryStats, HistoryWindow};
pub use manager::{
    ConversationConfig, ConversationError, ConversationManager, TurnResult, provider_error_message,
};
pub use store::{ConversationState, ConversationStore};
