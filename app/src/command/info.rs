use parley_config::{API_KEY_ENV, Config};
use parley_core::DecisionPolicy;

/// Strategy for displaying configuration information.
///
/// Prints the masked API key, the endpoint and the chat defaults.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        println!("=== parley Configuration ===\n");

        println!("API Key:");
        let gemini = &config.providers.gemini;
        let key = gemini.resolve_api_key().map_or_else(
            || format!("(not set, edit the config or export {API_KEY_ENV})"),
            |key| mask_key(&key),
        );
        println!("  Gemini: {key}");
        println!(
            "  Endpoint: {}",
            gemini
                .base_url
                .as_deref()
                .unwrap_or(parley_providers::DEFAULT_BASE_URL)
        );
        println!();

        let chat = &config.chat;
        println!("Chat Defaults:");
        println!("  Model: {}", chat.model);
        println!("  Max Tokens: {}", chat.max_tokens);
        println!("  Temperature: {}", chat.temperature);
        println!("  Request Timeout: {}s", chat.request_timeout_secs);
        if !chat.context.is_empty() {
            println!("  Context: {}", truncate(&chat.context, 60));
        }
        let limit = chat
            .history_limit
            .map_or_else(|| "(full history)".to_string(), |limit| format!("{limit} turns"));
        println!("  History Limit: {limit}");
        if let Some(budget) = chat.history_char_budget {
            println!("  History Char Budget: {budget}");
        }
        println!("  Clear Policy: {:?}", chat.clear_policy);
        println!(
            "  Structured Output: {}",
            format_decision(&chat.structured_output)
        );

        Ok(())
    }
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "***".to_string()
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{head}...")
    }
}

fn format_decision(policy: &DecisionPolicy) -> String {
    match policy {
        DecisionPolicy::Always => "always".to_string(),
        DecisionPolicy::Never => "never".to_string(),
        DecisionPolicy::Keywords(patterns) if patterns.is_empty() => {
            "keywords(default patterns)".to_string()
        }
        DecisionPolicy::Keywords(patterns) => format!("keywords({})", patterns.join(", ")),
    }
}
