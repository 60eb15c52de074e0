//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy type with its own input, dispatched
//! statically from `main`.

use std::time::Duration;

use parley_config::{API_KEY_ENV, Config};
use parley_conversation::ConversationConfig;
use parley_providers::{GeminiProvider, GenerationSettings};
use tracing::{info, warn};
use uuid::Uuid;

mod chat;
mod extract;
mod info;
mod init;
mod repl;
mod version;

pub use chat::{ChatInput, ChatStrategy};
pub use extract::{ExtractInput, ExtractStrategy};
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use version::VersionStrategy;

/// Build the Gemini provider from the loaded configuration.
fn build_provider(config: &Config) -> GeminiProvider {
    let gemini = &config.providers.gemini;
    let api_key = gemini.resolve_api_key().unwrap_or_else(|| {
        warn!("No Gemini API key found in config or {API_KEY_ENV}");
        String::new()
    });

    let mut provider = GeminiProvider::new(api_key)
        .with_settings(GenerationSettings {
            temperature: config.chat.temperature,
            max_output_tokens: config.chat.max_tokens,
        })
        .with_timeout(Duration::from_secs(config.chat.request_timeout_secs));

    if let Some(ref base_url) = gemini.base_url {
        info!("Using custom Gemini endpoint: {base_url}");
        provider = provider.with_base_url(base_url.clone());
    }

    provider
}

/// Merge chat defaults from the config file with command-line overrides.
fn build_conversation_config(
    config: &Config,
    session_id: Uuid,
    model: Option<String>,
    context: Option<String>,
) -> ConversationConfig {
    let defaults = &config.chat;
    ConversationConfig::default()
        .with_session_id(session_id)
        .with_model(model.unwrap_or_else(|| defaults.model.clone()))
        .with_context(context.unwrap_or_else(|| defaults.context.clone()))
        .with_history_limit(defaults.history_limit)
        .with_history_char_budget(defaults.history_char_budget)
        .with_clear_policy(defaults.clear_policy)
        .with_decision(defaults.structured_output.clone())
}

/// Core trait defining the contract for all command strategies.
///
/// Each strategy defines its own input type via the associated type, so
/// commands take typed parameters without boxing or runtime casting.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}
