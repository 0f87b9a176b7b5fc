// crates/server/src/routes/auth.rs
//! Admin account endpoints: register, login, logout, identity.
//!
//! Registration is open only while the database holds no accounts (first-run
//! bootstrap); after that it requires a valid admin cookie, which turns it
//! into an invite mechanism.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap},
    response::{AppendHeaders, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::auth::{
    auth_cookie, clear_cookie, generate_salt, hash_password, issue_token, token_from_headers,
    verify_password, verify_token, AdminClaims,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialsPayload {
    pub username: String,
    pub password: String,
}

/// The authenticated admin identity, as exposed to the frontend.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub username: String,
    pub role: String,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

/// POST /api/auth/register - Create an admin account.
///
/// The created account is signed in immediately, so first-run setup is a
/// single request.
async fn register(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<CredentialsPayload>,
) -> ApiResult<impl IntoResponse> {
    let username = payload.username.trim();
    if username.len() < 3 {
        return Err(ApiError::BadRequest(
            "username must be at least 3 characters".to_string(),
        ));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::BadRequest(
            "password must be at least 8 characters".to_string(),
        ));
    }

    // Past bootstrap, only a signed-in admin may create further accounts.
    let existing_users = state.db.count_users().await?;
    if existing_users > 0 {
        let authed = token_from_headers(&headers)
            .and_then(|token| verify_token(&state.auth, &token))
            .is_some();
        if !authed {
            return Err(ApiError::Unauthorized("registration is closed".to_string()));
        }
    }

    if state.db.find_user(username).await?.is_some() {
        return Err(ApiError::BadRequest("username is taken".to_string()));
    }

    let salt = generate_salt();
    let password_hash = hash_password(&salt, &payload.password);
    let now = Utc::now().timestamp();
    let account = state
        .db
        .create_user(username, &password_hash, &salt, now)
        .await?;

    let token = issue_token(&state.auth, &account)?;
    tracing::info!(username = %account.username, "Admin account created");

    Ok((
        AppendHeaders([(SET_COOKIE, auth_cookie(&token))]),
        Json(MeResponse {
            username: account.username,
            role: account.role,
        }),
    ))
}

/// POST /api/auth/login - Verify credentials and set the auth cookie.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CredentialsPayload>,
) -> ApiResult<impl IntoResponse> {
    // One message for both unknown-user and wrong-password paths.
    let invalid = || ApiError::Unauthorized("invalid credentials".to_string());

    let account = state
        .db
        .find_user(payload.username.trim())
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&account.salt, &payload.password, &account.password_hash) {
        tracing::warn!(username = %account.username, "Failed login attempt");
        return Err(invalid());
    }

    let token = issue_token(&state.auth, &account)?;
    tracing::info!(username = %account.username, "Admin logged in");

    Ok((
        AppendHeaders([(SET_COOKIE, auth_cookie(&token))]),
        Json(MeResponse {
            username: account.username,
            role: account.role,
        }),
    ))
}

/// POST /api/auth/logout - Clear the auth cookie.
///
/// Tokens are stateless so there is nothing to revoke server-side; the
/// cookie simply expires immediately.
async fn logout() -> impl IntoResponse {
    (
        AppendHeaders([(SET_COOKIE, clear_cookie())]),
        Json(serde_json::json!({ "ok": true })),
    )
}

/// GET /api/auth/me - Identity behind the current cookie.
async fn me(claims: AdminClaims) -> Json<MeResponse> {
    Json(MeResponse {
        username: claims.username,
        role: claims.role,
    })
}
