// crates/server/src/routes/comments.rs
//! Comment endpoints: public threads under published posts, admin moderation.
//!
//! New comments always land unapproved. The `comments` feature flag gates
//! submission only; approved threads stay readable when the form is off.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use crate::auth::AdminClaims;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use folio_core::{Comment, Post};

const MAX_COMMENT_CHARS: usize = 2_000;

#[derive(Debug, Deserialize)]
pub struct CommentPayload {
    pub author: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct ModerationQuery {
    /// Defaults to the moderation queue; `pending=false` lists everything.
    #[serde(default = "default_pending")]
    pub pending: bool,
}

fn default_pending() -> bool {
    true
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/posts/{slug}/comments", get(list_comments).post(submit_comment))
        .route("/admin/comments", get(moderation_list))
        .route("/admin/comments/{id}/approve", put(approve_comment))
        .route("/admin/comments/{id}", delete(delete_comment))
}

/// Resolve a slug to a published post, or 404. Drafts look exactly like
/// missing posts from the public side.
async fn published_post(state: &AppState, slug: &str) -> ApiResult<Post> {
    match state.db.get_post_by_slug(slug).await? {
        Some(post) if post.published => Ok(post),
        _ => Err(ApiError::PostNotFound(slug.to_string())),
    }
}

/// GET /api/posts/:slug/comments - Approved comments, oldest first.
async fn list_comments(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Vec<Comment>>> {
    let post = published_post(&state, &slug).await?;
    Ok(Json(state.db.comments_for_post(&post.id, true).await?))
}

/// POST /api/posts/:slug/comments - Submit a comment for moderation.
async fn submit_comment(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Json(payload): Json<CommentPayload>,
) -> ApiResult<Json<Comment>> {
    if !state.db.flag_enabled("comments").await? {
        return Err(ApiError::NotFound("comments are disabled".to_string()));
    }

    let author = payload.author.trim();
    let body = payload.body.trim();
    if author.is_empty() {
        return Err(ApiError::BadRequest("author is required".to_string()));
    }
    if body.is_empty() {
        return Err(ApiError::BadRequest("body is required".to_string()));
    }
    if body.chars().count() > MAX_COMMENT_CHARS {
        return Err(ApiError::BadRequest(format!(
            "body is limited to {MAX_COMMENT_CHARS} characters"
        )));
    }

    let post = published_post(&state, &slug).await?;
    let comment = state
        .db
        .create_comment(&post.id, author, body, Utc::now().timestamp())
        .await?;

    tracing::info!(post = %slug, author = %comment.author, "Comment queued for moderation");
    Ok(Json(comment))
}

/// GET /api/admin/comments?pending=true - Moderation listing.
async fn moderation_list(
    _claims: AdminClaims,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ModerationQuery>,
) -> ApiResult<Json<Vec<Comment>>> {
    Ok(Json(state.db.list_comments(query.pending).await?))
}

/// PUT /api/admin/comments/:id/approve - Publish a held comment.
async fn approve_comment(
    claims: AdminClaims,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    if !state.db.set_comment_approved(&id, true).await? {
        return Err(ApiError::NotFound(format!("comment {id}")));
    }
    tracing::info!(admin = %claims.username, comment_id = %id, "Comment approved");
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// DELETE /api/admin/comments/:id - Drop a comment entirely.
async fn delete_comment(
    claims: AdminClaims,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    if !state.db.delete_comment(&id).await? {
        return Err(ApiError::NotFound(format!("comment {id}")));
    }
    tracing::info!(admin = %claims.username, comment_id = %id, "Comment deleted");
    Ok(Json(serde_json::json!({ "ok": true })))
}
