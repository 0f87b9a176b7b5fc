// crates/core/src/assistant/types.rs
//! Request/response/error types for the chat assistant.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// One message in the chat transcript the client replays with each request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A reply request assembled by the server: visitor message, prior
/// transcript, and a system prompt built from the portfolio document.
#[derive(Debug, Clone)]
pub struct ReplyRequest {
    pub system_prompt: String,
    pub history: Vec<ChatMessage>,
    pub message: String,
}

/// Errors from assistant providers.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Request failed: {0}")]
    Http(String),

    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_serde_lowercase_roles() {
        let msg = ChatMessage::user("what did you build?");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"role\":\"user\""));

        let back: ChatMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_assistant_error_display() {
        let err = AssistantError::Timeout(15);
        assert_eq!(err.to_string(), "Timeout after 15 seconds");

        let err = AssistantError::Api {
            status: 429,
            message: "rate limited".to_string(),
        };
        assert_eq!(err.to_string(), "API returned 429: rate limited");
    }
}
