// crates/core/src/assistant/mod.rs
//! Chat assistant for the portfolio site.
//!
//! Provides the `AssistantProvider` trait, an Anthropic Messages API
//! implementation, and keyword-matched fallback replies for when no API
//! key is configured or the provider fails.

pub mod api;
pub mod fallback;
pub mod provider;
pub mod types;

pub use api::ApiProvider;
pub use fallback::fallback_reply;
pub use provider::AssistantProvider;
pub use types::{AssistantError, ChatMessage, ChatRole, ReplyRequest};
