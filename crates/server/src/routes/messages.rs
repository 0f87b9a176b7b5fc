// crates/server/src/routes/messages.rs
//! Contact-form endpoints: public submission, admin inbox.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use crate::auth::AdminClaims;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use folio_core::ContactMessage;

const MAX_MESSAGE_CHARS: usize = 5_000;

#[derive(Debug, Deserialize)]
pub struct ContactPayload {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct InboxQuery {
    #[serde(default)]
    pub unread: bool,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/contact", post(submit_message))
        .route("/admin/messages", get(inbox))
        .route("/admin/messages/{id}/read", put(mark_read))
        .route("/admin/messages/{id}", delete(delete_message))
}

/// POST /api/contact - Accept a contact-form submission.
async fn submit_message(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ContactPayload>,
) -> ApiResult<Json<ContactMessage>> {
    let name = payload.name.trim();
    let email = payload.email.trim();
    let body = payload.body.trim();

    if name.is_empty() {
        return Err(ApiError::BadRequest("name is required".to_string()));
    }
    // Enough validation to catch typos; real verification would mean
    // sending mail.
    if !email.contains('@') {
        return Err(ApiError::BadRequest("email looks invalid".to_string()));
    }
    if body.is_empty() {
        return Err(ApiError::BadRequest("body is required".to_string()));
    }
    if body.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ApiError::BadRequest(format!(
            "body is limited to {MAX_MESSAGE_CHARS} characters"
        )));
    }

    let subject = payload
        .subject
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let message = state
        .db
        .create_message(name, email, subject, body, Utc::now().timestamp())
        .await?;

    tracing::info!(from = %message.email, "Contact message received");
    Ok(Json(message))
}

/// GET /api/admin/messages?unread=true - The inbox, newest first.
async fn inbox(
    _claims: AdminClaims,
    State(state): State<Arc<AppState>>,
    Query(query): Query<InboxQuery>,
) -> ApiResult<Json<Vec<ContactMessage>>> {
    Ok(Json(state.db.list_messages(query.unread).await?))
}

/// PUT /api/admin/messages/:id/read - Mark one message read.
async fn mark_read(
    _claims: AdminClaims,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    if !state.db.mark_message_read(&id).await? {
        return Err(ApiError::NotFound(format!("message {id}")));
    }
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// DELETE /api/admin/messages/:id - Remove a message from the inbox.
async fn delete_message(
    claims: AdminClaims,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    if !state.db.delete_message(&id).await? {
        return Err(ApiError::NotFound(format!("message {id}")));
    }
    tracing::info!(admin = %claims.username, message_id = %id, "Message deleted");
    Ok(Json(serde_json::json!({ "ok": true })))
}
