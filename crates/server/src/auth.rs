// crates/server/src/auth.rs
//! Stateless admin authentication.
//!
//! Login issues a signed JWT carried in an HttpOnly cookie; every admin
//! request re-verifies the signature, so the server keeps no session table.
//! Passwords are stored as salted HMAC-SHA256 digests.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::COOKIE, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use folio_db::AdminAccount;
use hmac::{Hmac, Mac};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Name of the auth cookie set on login.
pub const AUTH_COOKIE: &str = "folio_token";

/// Tokens live for a week; after that the admin logs in again.
const TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// JWT signing/verification keys, derived from one shared secret.
pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl AuthKeys {
    /// Build keys from `FOLIO_JWT_SECRET`. Without one, a random
    /// per-process secret is generated and every restart invalidates
    /// outstanding tokens.
    pub fn from_env() -> Self {
        match std::env::var("FOLIO_JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => Self::from_secret(secret.as_bytes()),
            _ => {
                tracing::warn!(
                    "FOLIO_JWT_SECRET not set; using a random secret (admin sessions reset on restart)"
                );
                let mut secret = [0u8; 32];
                rand::thread_rng().fill_bytes(&mut secret);
                Self::from_secret(&secret)
            }
        }
    }

    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

impl std::fmt::Debug for AuthKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthKeys").finish_non_exhaustive()
    }
}

/// Claims embedded in the admin token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    /// Account id.
    pub sub: String,
    pub username: String,
    pub role: String,
    /// Issued-at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds); validated on decode.
    pub exp: i64,
}

/// Sign a token for the given account.
pub fn issue_token(keys: &AuthKeys, account: &AdminAccount) -> ApiResult<String> {
    let now = Utc::now().timestamp();
    let claims = AdminClaims {
        sub: account.id.clone(),
        username: account.username.clone(),
        role: account.role.clone(),
        iat: now,
        exp: now + TOKEN_TTL_SECS,
    };
    encode(&Header::default(), &claims, &keys.encoding)
        .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))
}

/// Verify a token and return its claims. `None` covers bad signatures,
/// malformed tokens, and expired tokens alike.
pub fn verify_token(keys: &AuthKeys, token: &str) -> Option<AdminClaims> {
    decode::<AdminClaims>(token, &keys.decoding, &Validation::default())
        .ok()
        .map(|data| data.claims)
}

/// Set-Cookie value for a fresh token.
pub fn auth_cookie(token: &str) -> String {
    format!("{AUTH_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={TOKEN_TTL_SECS}")
}

/// Set-Cookie value that clears the auth cookie.
pub fn clear_cookie() -> String {
    format!("{AUTH_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Pull the auth token out of the Cookie header, if present.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        pair.trim()
            .strip_prefix(AUTH_COOKIE)?
            .strip_prefix('=')
            .map(|v| v.to_string())
    })
}

impl FromRequestParts<std::sync::Arc<AppState>> for AdminClaims {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &std::sync::Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers)
            .ok_or_else(|| ApiError::Unauthorized("missing auth cookie".to_string()))?;
        verify_token(&state.auth, &token)
            .ok_or_else(|| ApiError::Unauthorized("invalid or expired token".to_string()))
    }
}

/// Random hex salt for a new account.
pub fn generate_salt() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Salted HMAC-SHA256 digest of a password, hex-encoded.
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(salt.as_bytes()).expect("HMAC accepts any key length");
    mac.update(password.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time password check against a stored digest.
pub fn verify_password(salt: &str, password: &str, expected_hash: &str) -> bool {
    let mut mac =
        HmacSha256::new_from_slice(salt.as_bytes()).expect("HMAC accepts any key length");
    mac.update(password.as_bytes());
    match hex::decode(expected_hash) {
        Ok(expected) => mac.verify_slice(&expected).is_ok(),
        Err(_) => false,
    }
}

/// Gate for the admin pages under `/admin`.
///
/// Unauthenticated requests are redirected to the login page; an
/// authenticated visit to the login or register page bounces back to the
/// dashboard. API routes live under `/api` and are untouched, each admin
/// handler enforces its own claims extractor.
pub async fn admin_page_gate(
    State(state): State<std::sync::Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if !path.starts_with("/admin") {
        return next.run(request).await;
    }

    let authed = token_from_headers(request.headers())
        .and_then(|token| verify_token(&state.auth, &token))
        .is_some();

    let entry_page = path == "/admin/login" || path == "/admin/register";
    if entry_page {
        if authed {
            return Redirect::to("/admin").into_response();
        }
        return next.run(request).await;
    }

    if !authed {
        return Redirect::to("/admin/login").into_response();
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn test_account() -> AdminAccount {
        AdminAccount {
            id: "u-1".to_string(),
            username: "tom".to_string(),
            password_hash: String::new(),
            salt: String::new(),
            role: "admin".to_string(),
            created_at: 0,
        }
    }

    #[test]
    fn test_token_round_trip() {
        let keys = AuthKeys::from_secret(b"test-secret");
        let token = issue_token(&keys, &test_account()).unwrap();

        let claims = verify_token(&keys, &token).expect("token should verify");
        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.username, "tom");
        assert_eq!(claims.role, "admin");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_rejects_wrong_secret() {
        let keys = AuthKeys::from_secret(b"test-secret");
        let other = AuthKeys::from_secret(b"different-secret");
        let token = issue_token(&keys, &test_account()).unwrap();

        assert!(verify_token(&other, &token).is_none());
    }

    #[test]
    fn test_token_rejects_garbage() {
        let keys = AuthKeys::from_secret(b"test-secret");
        assert!(verify_token(&keys, "not-a-jwt").is_none());
        assert!(verify_token(&keys, "").is_none());
    }

    #[test]
    fn test_expired_token_rejected() {
        let keys = AuthKeys::from_secret(b"test-secret");
        let now = Utc::now().timestamp();
        let claims = AdminClaims {
            sub: "u-1".to_string(),
            username: "tom".to_string(),
            role: "admin".to_string(),
            iat: now - 3600,
            // Well past the default decode leeway
            exp: now - 600,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).unwrap();

        assert!(verify_token(&keys, &token).is_none());
    }

    #[test]
    fn test_token_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; folio_token=abc123; lang=en"),
        );
        assert_eq!(token_from_headers(&headers), Some("abc123".to_string()));

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(token_from_headers(&headers), None);

        let headers = HeaderMap::new();
        assert_eq!(token_from_headers(&headers), None);
    }

    #[test]
    fn test_token_from_headers_ignores_prefix_names() {
        // A cookie named folio_token_v2 must not match.
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("folio_token_v2=nope; folio_token=yes"),
        );
        assert_eq!(token_from_headers(&headers), Some("yes".to_string()));
    }

    #[test]
    fn test_password_hash_and_verify() {
        let salt = generate_salt();
        let hash = hash_password(&salt, "hunter2hunter2");

        assert!(verify_password(&salt, "hunter2hunter2", &hash));
        assert!(!verify_password(&salt, "wrong-password", &hash));
        assert!(!verify_password(&salt, "hunter2hunter2", "deadbeef"));
        assert!(!verify_password(&salt, "hunter2hunter2", "not hex"));
    }

    #[test]
    fn test_salt_changes_hash() {
        let hash_a = hash_password("salt-a", "same-password");
        let hash_b = hash_password("salt-b", "same-password");
        assert_ne!(hash_a, hash_b);
    }

    #[test]
    fn test_generate_salt_is_unique_hex() {
        let a = generate_salt();
        let b = generate_salt();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_cookie_strings() {
        let cookie = auth_cookie("tok");
        assert!(cookie.starts_with("folio_token=tok"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));

        let cleared = clear_cookie();
        assert!(cleared.contains("Max-Age=0"));
    }
}
