use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use parley_core::{ClearPolicy, DecisionPolicy};

/// Environment variable consulted when the config file has no usable key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

const API_KEY_PLACEHOLDER: &str = "your-gemini-api-key-here";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub chat: ChatDefaults,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChatDefaults {
    #[serde(default = "ChatDefaults::default_model")]
    pub model: String,
    #[serde(default = "ChatDefaults::default_max_tokens")]
    pub max_tokens: usize,
    #[serde(default = "ChatDefaults::default_temperature")]
    pub temperature: f32,
    /// Steering context the session starts with
    #[serde(default)]
    pub context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_limit: Option<usize>,
    /// Character budget for the history sent with each request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_char_budget: Option<usize>,
    #[serde(default)]
    pub clear_policy: ClearPolicy,
    #[serde(default)]
    pub structured_output: DecisionPolicy,
    #[serde(default = "ChatDefaults::default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ChatDefaults {
    fn default() -> Self {
        Self {
            model: Self::default_model(),
            max_tokens: Self::default_max_tokens(),
            temperature: Self::default_temperature(),
            context: String::new(),
            history_limit: None,
            history_char_budget: None,
            clear_policy: ClearPolicy::default(),
            structured_output: DecisionPolicy::default(),
            request_timeout_secs: Self::default_request_timeout_secs(),
        }
    }
}

impl ChatDefaults {
    fn default_model() -> String {
        "gemini-2.0-flash".to_string()
    }

    const fn default_max_tokens() -> usize {
        8192
    }

    const fn default_temperature() -> f32 {
        0.7
    }

    const fn default_request_timeout_secs() -> u64 {
        120
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub gemini: ProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ProviderConfig {
    /// The configured key, or the environment variable when the file has none.
    #[must_use]
    pub fn resolve_api_key(&self) -> Option<String> {
        let configured = self.api_key.trim();
        if !configured.is_empty() && configured != API_KEY_PLACEHOLDER {
            return Some(configured.to_string());
        }
        debug!("No API key in config file, checking {API_KEY_ENV}");
        std::env::var(API_KEY_ENV)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }
}

impl Config {
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("parley"))
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'parley init' to create config.",
                config_path.display()
            );
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {e}", path.display()))?;

        Ok(config)
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        std::fs::write(&config_path, Self::template())?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Edit the config file and add your Gemini API key");
        println!("      (or export {API_KEY_ENV} instead)");
        println!("   2. Run 'parley chat' to start a conversation");
        println!();
        println!("🔧 Configuration options:");
        println!("   - context: Steering text the assistant sees before every turn");
        println!("   - history_limit: Number of recent turns sent with each request");
        println!("   - history_char_budget: Character cap on the history sent with each request");
        println!("   - clear_policy: keep_context or clear_context when history is cleared");
        println!("   - structured_output: always, never, or keywords with patterns");
        println!();
        Ok(())
    }

    #[must_use]
    pub const fn template() -> &'static str {
        r#"{
  "chat": {
    "model": "gemini-2.0-flash",
    "max_tokens": 8192,
    "temperature": 0.7,
    "context": "",
    "history_limit": 20,
    "clear_policy": "keep_context",
    "structured_output": {
      "strategy": "always"
    },
    "request_timeout_secs": 120
  },
  "providers": {
    "gemini": {
      "api_key": "your-gemini-api-key-here"
    }
  }
}"#
    }
}
