// crates/server/src/routes/portfolio.rs
//! Portfolio content document: public read, admin replace.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use ts_rs::TS;

use crate::auth::AdminClaims;
use crate::error::ApiResult;
use crate::state::AppState;
use folio_core::PortfolioDoc;

/// The portfolio document plus its last-saved timestamp.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct PortfolioResponse {
    #[serde(flatten)]
    pub doc: PortfolioDoc,
    #[ts(type = "number")]
    pub updated_at: i64,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/portfolio", get(get_portfolio))
        .route("/admin/portfolio", put(save_portfolio))
}

/// GET /api/portfolio - The public portfolio document.
async fn get_portfolio(State(state): State<Arc<AppState>>) -> ApiResult<Json<PortfolioResponse>> {
    let (doc, updated_at) = state.db.get_portfolio().await?;
    Ok(Json(PortfolioResponse { doc, updated_at }))
}

/// PUT /api/admin/portfolio - Replace the portfolio document wholesale.
///
/// Fields missing from the payload reset to their defaults; the frontend
/// always sends the full document.
async fn save_portfolio(
    claims: AdminClaims,
    State(state): State<Arc<AppState>>,
    Json(doc): Json<PortfolioDoc>,
) -> ApiResult<Json<PortfolioResponse>> {
    let now = Utc::now().timestamp();
    state.db.save_portfolio(&doc, now).await?;
    tracing::info!(admin = %claims.username, "Portfolio document updated");
    Ok(Json(PortfolioResponse {
        doc,
        updated_at: now,
    }))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use folio_db::Database;
    use tower::ServiceExt;

    async fn test_db() -> Database {
        Database::new_in_memory().await.expect("in-memory DB")
    }

    fn build_app(db: Database) -> Router {
        crate::create_app(db)
    }

    async fn admin_cookie(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/register")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({ "username": "admin", "password": "correct-horse" })
                            .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        response
            .headers()
            .get("set-cookie")
            .expect("register sets the auth cookie")
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string()
    }

    async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn put_json(
        app: &Router,
        uri: &str,
        body: serde_json::Value,
        cookie: Option<&str>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder()
            .method("PUT")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        let response = app
            .clone()
            .oneshot(builder.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_get_portfolio_starts_empty() {
        let app = build_app(test_db().await);
        let (status, json) = get_json(&app, "/api/portfolio").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "");
        assert_eq!(json["skills"].as_array().unwrap().len(), 0);
        assert_eq!(json["updatedAt"], 0);
    }

    #[tokio::test]
    async fn test_save_requires_auth() {
        let app = build_app(test_db().await);
        let (status, _) = put_json(
            &app,
            "/api/admin/portfolio",
            serde_json::json!({ "name": "Tom" }),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_save_then_read_round_trip() {
        let app = build_app(test_db().await);
        let cookie = admin_cookie(&app).await;

        let doc = serde_json::json!({
            "name": "Tom",
            "headline": "Rust engineer",
            "skills": ["rust", "sqlite"],
            "projects": [{ "title": "folio", "description": "this site", "tags": ["axum"] }],
            "socials": { "github": "https://github.com/tom" }
        });
        let (status, saved) = put_json(&app, "/api/admin/portfolio", doc, Some(&cookie)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(saved["updatedAt"].as_i64().unwrap() > 0);

        let (_, json) = get_json(&app, "/api/portfolio").await;
        assert_eq!(json["name"], "Tom");
        assert_eq!(json["headline"], "Rust engineer");
        assert_eq!(json["skills"].as_array().unwrap().len(), 2);
        assert_eq!(json["projects"][0]["title"], "folio");
        assert_eq!(json["socials"]["github"], "https://github.com/tom");
    }

    #[tokio::test]
    async fn test_partial_document_fills_defaults() {
        let app = build_app(test_db().await);
        let cookie = admin_cookie(&app).await;

        let (status, _) = put_json(
            &app,
            "/api/admin/portfolio",
            serde_json::json!({ "name": "Tom" }),
            Some(&cookie),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, json) = get_json(&app, "/api/portfolio").await;
        assert_eq!(json["name"], "Tom");
        assert_eq!(json["about"], "");
        assert!(json["experience"].as_array().unwrap().is_empty());
    }
}
