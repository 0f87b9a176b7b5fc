// crates/server/src/lib.rs
//! folio server library.
//!
//! Axum HTTP server for the portfolio site: public content, visitor
//! tracking, the chat assistant, and a cookie-authenticated admin API.
//! In production it also serves the built frontend and gates the admin
//! pages behind the auth cookie.

pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use metrics::{init_metrics, render_metrics};
pub use routes::api_routes;
pub use state::AppState;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{middleware, Router};
use folio_db::Database;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Assemble the router. `static_dir` adds frontend serving and the admin
/// page gate; `None` is the API-only shape used by tests.
fn build_router(state: Arc<AppState>, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .merge(api_routes(state.clone()))
        .merge(routes::metrics::router().with_state(state.clone()));

    if let Some(dir) = static_dir {
        // Unknown paths fall back to index.html so client-side routing
        // works on hard refresh.
        let spa = ServeDir::new(&dir)
            .append_index_html_on_directories(true)
            .not_found_service(ServeFile::new(dir.join("index.html")));
        router = router
            .fallback_service(spa)
            .layer(middleware::from_fn_with_state(state, auth::admin_page_gate))
            .layer(CompressionLayer::new());
    }

    router.layer(cors).layer(TraceLayer::new_for_http())
}

/// Create the API-only application.
pub fn create_app(db: Database) -> Router {
    build_router(AppState::new(db), None)
}

/// Create the application from pre-built state. Tests use this to inject
/// a stub assistant provider.
pub fn create_app_with_state(state: Arc<AppState>) -> Router {
    build_router(state, None)
}

/// Create the full application, optionally serving the frontend bundle.
pub fn create_app_full(db: Database, static_dir: Option<PathBuf>) -> Router {
    build_router(AppState::new(db), static_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    async fn test_db() -> Database {
        Database::new_in_memory().await.expect("in-memory DB")
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
        cookie: Option<&str>,
    ) -> axum::http::Response<axum::body::Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app.clone().oneshot(request).await.unwrap()
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
        let response = send(app, "GET", uri, None, None).await;
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_app(test_db().await);
        let (status, body) = get(&app, "/api/health").await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["database"], "ok");
        assert!(json["version"].is_string());
        assert!(json["uptime_secs"].is_number());
    }

    #[tokio::test]
    async fn test_track_session_through_full_stack() {
        let app = create_app(test_db().await);

        let request = Request::builder()
            .method("POST")
            .uri("/api/track/session")
            .header("content-type", "application/json")
            .header("user-agent", "Mozilla/5.0 (X11; Linux x86_64) Firefox/121.0")
            .body(Body::from(
                serde_json::json!({ "visitorId": "v-1", "page": "/" }).to_string(),
            ))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["sessionId"].as_str().unwrap().starts_with("s-"));
    }

    #[tokio::test]
    async fn test_admin_endpoints_reject_unauthenticated() {
        let app = create_app(test_db().await);
        let (status, body) = get(&app, "/api/admin/stats/dashboard").await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], "Unauthorized");
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let app = create_app(test_db().await);

        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/health")
                    .header("Origin", "http://localhost:3000")
                    .header("Access-Control-Request-Method", "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.headers().contains_key("access-control-allow-origin"));
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let app = create_app(test_db().await);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .header("Origin", "http://example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let allow_origin = response.headers().get("access-control-allow-origin");
        assert_eq!(allow_origin.unwrap(), "*");
    }

    #[tokio::test]
    async fn test_404_for_unknown_api_route() {
        let app = create_app(test_db().await);
        let (status, _) = get(&app, "/api/nonexistent").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_root_404_without_static_dir() {
        let app = create_app(test_db().await);
        let (status, _) = get(&app, "/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_multiple_requests() {
        let app = create_app(test_db().await);

        let (status1, _) = get(&app, "/api/health").await;
        assert_eq!(status1, StatusCode::OK);
        let (status2, _) = get(&app, "/api/health").await;
        assert_eq!(status2, StatusCode::OK);
    }

    /// Static serving plus the admin page gate, end to end.
    #[tokio::test]
    async fn test_static_serving_and_admin_page_gate() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("index.html"), "<html>folio</html>").unwrap();

        let app = create_app_full(test_db().await, Some(dir.path().to_path_buf()));

        // Frontend is served at the root
        let (status, body) = get(&app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("folio"));

        // Client-side routes fall back to index.html
        let (status, body) = get(&app, "/blog/some-post").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("folio"));

        // Unauthenticated admin pages bounce to the login page
        let response = send(&app, "GET", "/admin", None, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), "/admin/login");

        let response = send(&app, "GET", "/admin/stats", None, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        // The login page itself stays reachable
        let response = send(&app, "GET", "/admin/login", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);

        // Sign in, then the gate flips direction
        let response = send(
            &app,
            "POST",
            "/api/auth/register",
            Some(serde_json::json!({ "username": "admin", "password": "correct-horse" })),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get("set-cookie")
            .unwrap()
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();

        let response = send(&app, "GET", "/admin", None, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, "GET", "/admin/login", None, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), "/admin");
    }

    #[tokio::test]
    async fn test_api_not_shadowed_by_static_fallback() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("index.html"), "<html>folio</html>").unwrap();

        let app = create_app_full(test_db().await, Some(dir.path().to_path_buf()));
        let (status, body) = get(&app, "/api/health").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"status\""));
    }
}
