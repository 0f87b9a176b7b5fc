// crates/server/src/routes/posts.rs
//! Blog post endpoints: public reads of published posts, admin CRUD.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use crate::auth::AdminClaims;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use folio_core::Post;
use folio_db::{NewPost, PostUpdate};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostPayload {
    pub title: String,
    /// Explicit slug; derived from the title when omitted.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub published: Option<bool>,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/posts", get(list_published))
        .route("/posts/{slug}", get(get_published))
        .route("/admin/posts", get(list_all).post(create_post))
        .route("/admin/posts/{id}", put(update_post).delete(delete_post))
}

/// GET /api/posts - Published posts, newest first.
async fn list_published(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Post>>> {
    Ok(Json(state.db.list_posts(true).await?))
}

/// GET /api/posts/:slug - One published post.
///
/// Drafts answer 404 here; they are indistinguishable from missing posts
/// to the public.
async fn get_published(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Post>> {
    match state.db.get_post_by_slug(&slug).await? {
        Some(post) if post.published => Ok(Json(post)),
        _ => Err(ApiError::PostNotFound(slug)),
    }
}

/// GET /api/admin/posts - All posts including drafts.
async fn list_all(
    _claims: AdminClaims,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Post>>> {
    Ok(Json(state.db.list_posts(false).await?))
}

/// POST /api/admin/posts - Create a post.
async fn create_post(
    claims: AdminClaims,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreatePostPayload>,
) -> ApiResult<Json<Post>> {
    let title = payload.title.trim();
    if title.is_empty() {
        return Err(ApiError::BadRequest("title is required".to_string()));
    }

    let slug = match payload.slug.as_deref().map(str::trim) {
        Some(slug) if !slug.is_empty() => slug.to_string(),
        _ => slugify(title),
    };
    if slug.is_empty() {
        return Err(ApiError::BadRequest(
            "slug is required when the title has no usable characters".to_string(),
        ));
    }
    // Friendly pre-check; the UNIQUE constraint still backs this up.
    if state.db.slug_taken(&slug).await? {
        return Err(ApiError::BadRequest(format!("slug '{slug}' is taken")));
    }

    let new = NewPost {
        slug,
        title: title.to_string(),
        summary: payload.summary,
        body: payload.body,
        tags: payload.tags,
        published: payload.published,
    };
    let post = state.db.create_post(&new, Utc::now().timestamp()).await?;

    tracing::info!(
        admin = %claims.username,
        slug = %post.slug,
        published = post.published,
        "Post created"
    );
    Ok(Json(post))
}

/// PUT /api/admin/posts/:id - Partially update a post.
async fn update_post(
    _claims: AdminClaims,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePostPayload>,
) -> ApiResult<Json<Post>> {
    // A slug change must not collide with a different post.
    if let Some(slug) = payload.slug.as_deref().map(str::trim) {
        if slug.is_empty() {
            return Err(ApiError::BadRequest("slug cannot be empty".to_string()));
        }
        if let Some(other) = state.db.get_post_by_slug(slug).await? {
            if other.id != id {
                return Err(ApiError::BadRequest(format!("slug '{slug}' is taken")));
            }
        }
    }

    let update = PostUpdate {
        slug: payload.slug.map(|s| s.trim().to_string()),
        title: payload.title,
        summary: payload.summary,
        body: payload.body,
        tags: payload.tags,
        published: payload.published,
    };

    match state
        .db
        .update_post(&id, &update, Utc::now().timestamp())
        .await?
    {
        Some(post) => Ok(Json(post)),
        None => Err(ApiError::PostNotFound(id)),
    }
}

/// DELETE /api/admin/posts/:id - Delete a post and its comments.
async fn delete_post(
    claims: AdminClaims,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    if !state.db.delete_post(&id).await? {
        return Err(ApiError::PostNotFound(id));
    }
    tracing::info!(admin = %claims.username, post_id = %id, "Post deleted");
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// Derive a URL slug from a post title: lowercase ASCII alphanumerics with
/// single dashes between runs of anything else.
fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_dash = true;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
