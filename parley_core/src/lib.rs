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

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod error;
pub mod policy;
pub mod structured;

pub use error::{ProviderError, ProviderErrorKind, ValidationError};
pub use policy::{ClearPolicy, DecisionPolicy};
pub use structured::{PARSE_FAILED, StructuredSummary};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Role expected at a given position of a well-formed log.
    #[must_use]
    pub const fn for_position(index: usize) -> Self {
        if index % 2 == 0 {
            Self::User
        } else {
            Self::Assistant
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" => Err(ValidationError::EmptyRole),
            "user" => Ok(Self::User),
            "assistant" | "model" | "bot" => Ok(Self::Assistant),
            other => Err(ValidationError::UnknownRole(other.to_string())),
        }
    }
}

/// A single entry of the conversation log.
///
/// Fields are private so a message cannot change after it is created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    role: Role,
    text: String,
}

impl Message {
    #[must_use]
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Part {
    pub text: String,
}

/// Role/parts shaped history entry, as sent with the next request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl HistoryEntry {
    #[must_use]
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part { text: text.into() }],
        }
    }
}

impl From<&Message> for HistoryEntry {
    fn from(message: &Message) -> Self {
        Self::text(message.role(), message.text())
    }
}

/// How a single turn should be answered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    FreeText,
    #[default]
    Structured,
}

impl OutputMode {
    #[must_use]
    pub const fn is_structured(self) -> bool {
        matches!(self, Self::Structured)
    }
}

#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Send the composed history plus the newest prompt and return the raw reply text.
    async fn generate(
        &self,
        history: &[HistoryEntry],
        prompt: &str,
        mode: OutputMode,
        model: &str,
    ) -> Result<String, ProviderError>;

    fn get_default_model(&self) -> &str;
}

#[async_trait]
impl<T: LLMProvider + ?Sized> LLMProvider for std::sync::Arc<T> {
    async fn generate(
        &self,
        history: &[HistoryEntry],
        prompt: &str,
        mode: OutputMode,
        model: &str,
    ) -> Result<String, ProviderError> {
        (**self).generate(history, prompt, mode, model).await
    }

    fn get_default_model(&self) -> &str {
        (**self).get_default_model()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_known_labels() {
        assert_eq!("user".parse::<Role>(), Ok(Role::User));
        assert_eq!(" Model ".parse::<Role>(), Ok(Role::Assistant));
        assert_eq!("assistant".parse::<Role>(), Ok(Role::Assistant));
    }

    #[test]
    fn role_rejects_empty_and_unknown_labels() {
        assert_eq!("".parse::<Role>(), Err(ValidationError::EmptyRole));
        assert_eq!("  ".parse::<Role>(), Err(ValidationError::EmptyRole));
        assert_eq!(
            "system".parse::<Role>(),
            Err(ValidationError::UnknownRole("system".to_string()))
        );
    }

    #[test]
    fn history_entry_from_message() {
        let message = Message::new(Role::Assistant, "hi");
        let entry = HistoryEntry::from(&message);
        assert_eq!(entry.role, Role::Assistant);
        assert_eq!(entry.parts, vec![Part { text: "hi".into() }]);
    }

    #[test]
    fn history_entry_serializes_role_parts_shape() {
        let entry = HistoryEntry::text(Role::User, "hello");
        let value = serde_json::to_value(&entry).unwrap_or_default();
        assert_eq!(
            value,
            serde_json::json!({"role": "user", "parts": [{"text": "hello"}]})
        );
    }

    #[test]
    fn position_roles_alternate() {
        assert_eq!(Role::for_position(0), Role::User);
        assert_eq!(Role::for_position(1), Role::Assistant);
        assert_eq!(Role::for_position(4), Role::User);
    }
}
