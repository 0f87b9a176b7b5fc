// crates/core/src/assistant/api.rs
//! Anthropic Messages API provider.

use std::time::Duration;

use async_trait::async_trait;

use super::provider::AssistantProvider;
use super::types::{AssistantError, ReplyRequest};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-haiku-4-5";
const MAX_REPLY_TOKENS: u32 = 512;

/// Assistant backed by the Anthropic Messages API.
pub struct ApiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

impl ApiProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            timeout_secs: 15,
        }
    }

    /// Set the per-request timeout in seconds.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Build a provider from `FOLIO_ASSISTANT_API_KEY` /
    /// `FOLIO_ASSISTANT_MODEL`. Returns None when no key is set, which the
    /// server treats as "fallback replies only".
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("FOLIO_ASSISTANT_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())?;
        let model = std::env::var("FOLIO_ASSISTANT_MODEL")
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Some(Self::new(api_key, model))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Assemble the Messages API request body: replayed transcript plus the
    /// new visitor message, with the portfolio system prompt alongside.
    fn build_body(&self, request: &ReplyRequest) -> serde_json::Value {
        let mut messages: Vec<serde_json::Value> = request
            .history
            .iter()
            .map(|m| {
                serde_json::json!({
                    "role": m.role.as_str(),
                    "content": m.content,
                })
            })
            .collect();
        messages.push(serde_json::json!({
            "role": "user",
            "content": request.message,
        }));

        serde_json::json!({
            "model": self.model,
            "max_tokens": MAX_REPLY_TOKENS,
            "system": request.system_prompt,
            "messages": messages,
        })
    }
}

#[async_trait]
impl AssistantProvider for ApiProvider {
    async fn reply(&self, request: ReplyRequest) -> Result<String, AssistantError> {
        let body = self.build_body(&request);

        let response = self
            .client
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .timeout(Duration::from_secs(self.timeout_secs))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AssistantError::Timeout(self.timeout_secs)
                } else {
                    AssistantError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(200)
                .collect();
            return Err(AssistantError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AssistantError::Parse(e.to_string()))?;

        let text = parsed
            .get("content")
            .and_then(|c| c.get(0))
            .and_then(|block| block.get("text"))
            .and_then(|t| t.as_str())
            .ok_or_else(|| AssistantError::Parse("no text block in response".to_string()))?;

        Ok(text.trim().to_string())
    }

    fn name(&self) -> &str {
        "anthropic-api"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::types::ChatMessage;

    fn request_with_history() -> ReplyRequest {
        ReplyRequest {
            system_prompt: "You answer questions about this portfolio.".to_string(),
            history: vec![
                ChatMessage::user("hi"),
                ChatMessage::assistant("Hello! Ask me anything about the site."),
            ],
            message: "what projects are listed?".to_string(),
        }
    }

    #[test]
    fn test_build_body_shape() {
        let provider = ApiProvider::new("sk-test", "claude-haiku-4-5");
        let body = provider.build_body(&request_with_history());

        assert_eq!(body["model"], "claude-haiku-4-5");
        assert_eq!(body["system"], "You answer questions about this portfolio.");

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[1]["role"], "assistant");
        // The new visitor message always comes last as a user turn.
        assert_eq!(messages[2]["role"], "user");
        assert_eq!(messages[2]["content"], "what projects are listed?");
    }

    #[test]
    fn test_build_body_without_history() {
        let provider = ApiProvider::new("sk-test", "claude-haiku-4-5");
        let body = provider.build_body(&ReplyRequest {
            system_prompt: String::new(),
            history: Vec::new(),
            message: "hello".to_string(),
        });

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["content"], "hello");
    }

    #[test]
    fn test_provider_name_and_timeout_builder() {
        let provider = ApiProvider::new("sk-test", "claude-haiku-4-5").with_timeout(30);
        assert_eq!(provider.name(), "anthropic-api");
        assert_eq!(provider.timeout_secs, 30);
    }
}
