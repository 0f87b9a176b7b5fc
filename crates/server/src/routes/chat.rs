// crates/server/src/routes/chat.rs
//! Chat assistant endpoint.
//!
//! Delegates to whichever `AssistantProvider` is configured and falls back
//! to canned replies when there is none or it fails. The widget never sees
//! a provider error, only a less clever answer.

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use folio_core::assistant::{ChatMessage, ReplyRequest};
use folio_core::{fallback_reply, PortfolioDoc};

/// Replayed-transcript cap; older turns are dropped silently.
const MAX_HISTORY_MESSAGES: usize = 10;
const MAX_MESSAGE_CHARS: usize = 2_000;

#[derive(Debug, Deserialize)]
pub struct ChatPayload {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
pub struct ChatResponse {
    pub reply: String,
    /// "assistant" when a live provider answered, "fallback" otherwise.
    pub source: String,
}

impl ChatResponse {
    fn assistant(reply: String) -> Self {
        Self {
            reply,
            source: "assistant".to_string(),
        }
    }

    fn fallback(message: &str) -> Self {
        Self {
            reply: fallback_reply(message).to_string(),
            source: "fallback".to_string(),
        }
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(chat))
}

/// POST /api/chat - Answer a visitor question about the site owner.
async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatPayload>,
) -> ApiResult<Json<ChatResponse>> {
    if !state.db.flag_enabled("chat").await? {
        return Err(ApiError::NotFound("chat is disabled".to_string()));
    }

    let message = payload.message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("message is required".to_string()));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ApiError::BadRequest(format!(
            "message is limited to {MAX_MESSAGE_CHARS} characters"
        )));
    }

    let Some(provider) = &state.assistant else {
        return Ok(Json(ChatResponse::fallback(message)));
    };

    let mut history = payload.history;
    if history.len() > MAX_HISTORY_MESSAGES {
        history.drain(..history.len() - MAX_HISTORY_MESSAGES);
    }

    let (doc, _) = state.db.get_portfolio().await?;
    let request = ReplyRequest {
        system_prompt: build_system_prompt(&doc),
        history,
        message: message.to_string(),
    };

    match provider.reply(request).await {
        Ok(reply) => Ok(Json(ChatResponse::assistant(reply))),
        Err(err) => {
            tracing::warn!(
                provider = provider.name(),
                error = %err,
                "Assistant provider failed, answering from fallback"
            );
            Ok(Json(ChatResponse::fallback(message)))
        }
    }
}

/// Assemble the system prompt from the stored portfolio document so the
/// assistant answers with the owner's actual content, not hallucinated
/// biography.
fn build_system_prompt(doc: &PortfolioDoc) -> String {
    let mut prompt = String::from(
        "You are a concise assistant embedded in a personal portfolio site. \
         Answer visitor questions about the site owner using only the facts \
         below. Keep replies to a short paragraph. When you do not know, \
         point the visitor at the contact form.\n",
    );

    if !doc.name.is_empty() {
        prompt.push_str("\nOwner: ");
        prompt.push_str(&doc.name);
    }
    if !doc.headline.is_empty() {
        prompt.push_str("\nHeadline: ");
        prompt.push_str(&doc.headline);
    }
    if !doc.about.is_empty() {
        prompt.push_str("\nAbout: ");
        prompt.push_str(&doc.about);
    }
    if !doc.skills.is_empty() {
        prompt.push_str("\nSkills: ");
        prompt.push_str(&doc.skills.join(", "));
    }
    if !doc.projects.is_empty() {
        prompt.push_str("\nProjects:");
        for project in &doc.projects {
            prompt.push_str(&format!("\n- {}: {}", project.title, project.description));
        }
    }
    if !doc.experience.is_empty() {
        prompt.push_str("\nExperience:");
        for entry in &doc.experience {
            let end = entry.end.as_deref().unwrap_or("present");
            prompt.push_str(&format!(
                "\n- {} at {} ({} to {}): {}",
                entry.role, entry.company, entry.start, end, entry.summary
            ));
        }
    }
    prompt
}
