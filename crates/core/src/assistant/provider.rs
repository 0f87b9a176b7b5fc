// crates/core/src/assistant/provider.rs
//! AssistantProvider trait defining the interface for chat backends.

use async_trait::async_trait;

use super::types::{AssistantError, ReplyRequest};

/// Trait for assistant backends that can answer visitor questions.
///
/// Implementations:
/// - `ApiProvider` — Anthropic Messages API over HTTPS
///
/// Provider failures are expected and non-fatal: the chat route falls back
/// to canned replies rather than surfacing an error to the visitor.
#[async_trait]
pub trait AssistantProvider: Send + Sync {
    /// Produce a reply to the visitor's message.
    async fn reply(&self, request: ReplyRequest) -> Result<String, AssistantError>;

    /// Provider name for logging (e.g. "anthropic-api").
    fn name(&self) -> &str;
}
