use std::time::Duration;

use async_trait::async_trait;
use parley_core::{HistoryEntry, LLMProvider, OutputMode, ProviderError, Role};
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Sampling settings sent with every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub max_output_tokens: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 8192,
        }
    }
}

pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    settings: GenerationSettings,
}

impl GeminiProvider {
    #[must_use]
    pub fn new(api_key: String) -> Self {
        info!("Creating GeminiProvider");
        Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            settings: GenerationSettings::default(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub const fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Bound each request by a client-side timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        match Client::builder().timeout(timeout).build() {
            Ok(client) => self.client = client,
            Err(e) => debug!("Keeping default HTTP client, timeout not applied: {e}"),
        }
        self
    }

    /// Build the `generateContent` body: history first, then the new prompt as a user turn.
    fn build_request(&self, history: &[HistoryEntry], prompt: &str) -> Value {
        let mut contents: Vec<Value> = history
            .iter()
            .map(|entry| {
                json!({
                    "role": wire_role(entry.role),
                    "parts": entry.parts,
                })
            })
            .collect();
        contents.push(json!({
            "role": wire_role(Role::User),
            "parts": [{ "text": prompt }],
        }));

        json!({
            "contents": contents,
            "generationConfig": {
                "temperature": self.settings.temperature,
                "maxOutputTokens": self.settings.max_output_tokens,
            },
        })
    }

    /// Helper method to send a single request
    async fn try_send(&self, model: &str, request: &Value) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(format!("{}/models/{model}:generateContent", self.base_url))
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("unreadable response body: {e}")))?;
        let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::Null);

        if !status.is_success() {
            let message = body["error"]["message"]
                .as_str()
                .map_or_else(|| status.to_string(), ToString::to_string);
            return Err(ProviderError::from_status(status.as_u16(), message));
        }

        parse_reply(&body)
    }
}

/// Gemini calls the assistant side of a conversation "model".
const fn wire_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "model",
    }
}

/// Join the text parts of the first candidate.
fn parse_reply(body: &Value) -> Result<String, ProviderError> {
    let parts = body["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| {
            let reason = body["promptFeedback"]["blockReason"]
                .as_str()
                .or_else(|| body["candidates"][0]["finishReason"].as_str())
                .unwrap_or("missing content");
            ProviderError::unknown(format!("Invalid response format: {reason}"))
        })?;

    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    if text.trim().is_empty() {
        return Err(ProviderError::empty_response());
    }
    Ok(text)
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    async fn generate(
        &self,
        history: &[HistoryEntry],
        prompt: &str,
        mode: OutputMode,
        model: &str,
    ) -> Result<String, ProviderError> {
        if self.api_key.trim().is_empty() {
            return Err(ProviderError::auth("no Gemini API key configured"));
        }

        let request = self.build_request(history, prompt);
        info!(
            "Sending request to Gemini API: model={model}, mode={mode:?}, history_len={}",
            history.len()
        );

        let reply = self.try_send(model, &request).await?;

        info!("Received response from Gemini API");
        Ok(reply)
    }

    fn get_default_model(&self) -> &'static str {
        DEFAULT_MODEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::ProviderErrorKind;

    #[test]
    fn request_maps_roles_and_appends_prompt() {
        let provider = GeminiProvider::new("key".to_string());
        let history = vec![
            HistoryEntry::text(Role::User, "Hi"),
            HistoryEntry::text(Role::Assistant, "Hello!"),
        ];

        let request = provider.build_request(&history, "How are you?");

        assert_eq!(
            request["contents"],
            json!([
                {"role": "user", "parts": [{"text": "Hi"}]},
                {"role": "model", "parts": [{"text": "Hello!"}]},
                {"role": "user", "parts": [{"text": "How are you?"}]},
            ])
        );
        assert_eq!(request["generationConfig"]["maxOutputTokens"], 8192);
    }

    #[test]
    fn reply_text_parts_are_joined() {
        let body = json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hello, "}, {"text": "world"}]}
            }]
        });
        assert_eq!(parse_reply(&body).ok().as_deref(), Some("Hello, world"));
    }

    #[test]
    fn blocked_reply_is_an_error() {
        let body = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        let err = parse_reply(&body).err();
        assert_eq!(err.as_ref().map(|e| e.kind), Some(ProviderErrorKind::Unknown));
        assert!(err.is_some_and(|e| e.message.contains("SAFETY")));
    }

    #[test]
    fn empty_reply_is_an_error() {
        let body = json!({"candidates": [{"content": {"parts": [{"text": "  "}]}}]});
        assert_eq!(
            parse_reply(&body).err().map(|e| e.kind),
            Some(ProviderErrorKind::EmptyResponse)
        );
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let provider =
            GeminiProvider::new("key".to_string()).with_base_url("http://localhost:8080/".into());
        assert_eq!(provider.base_url, "http://localhost:8080");
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_sending() {
        let provider = GeminiProvider::new(String::new());
        let result = provider
            .generate(&[], "hello", OutputMode::FreeText, DEFAULT_MODEL)
            .await;
        assert_eq!(result.err().map(|e| e.kind), Some(ProviderErrorKind::Auth));
    }
}
