// crates/server/src/routes/flags.rs
//! Feature flags: the client reads a `{ key: enabled }` map at boot to
//! decide which widgets to mount; admins flip flags without a deploy.

use std::collections::BTreeMap;
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
use folio_core::FeatureFlag;

#[derive(Debug, Deserialize)]
pub struct FlagPayload {
    pub enabled: bool,
    /// Omitted keeps the stored note; present replaces it.
    #[serde(default)]
    pub note: Option<String>,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/flags", get(public_flags))
        .route("/admin/flags", get(list_flags))
        .route("/admin/flags/{key}", put(set_flag))
}

/// GET /api/flags - The boot-time toggle map.
async fn public_flags(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<BTreeMap<String, bool>>> {
    let flags = state.db.list_flags().await?;
    Ok(Json(
        flags.into_iter().map(|f| (f.key, f.enabled)).collect(),
    ))
}

/// GET /api/admin/flags - Full flag rows with notes and timestamps.
async fn list_flags(
    _claims: AdminClaims,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<FeatureFlag>>> {
    Ok(Json(state.db.list_flags().await?))
}

/// PUT /api/admin/flags/:key - Create or update a flag.
async fn set_flag(
    claims: AdminClaims,
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(payload): Json<FlagPayload>,
) -> ApiResult<Json<FeatureFlag>> {
    let key = key.trim();
    if key.is_empty() {
        return Err(ApiError::BadRequest("flag key is required".to_string()));
    }

    let flag = state
        .db
        .set_flag(
            key,
            payload.enabled,
            payload.note.as_deref(),
            Utc::now().timestamp(),
        )
        .await?;

    tracing::info!(admin = %claims.username, flag = %flag.key, enabled = flag.enabled, "Flag updated");
    Ok(Json(flag))
}
