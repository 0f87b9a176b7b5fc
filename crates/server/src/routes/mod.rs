//! API route handlers for the folio server.

pub mod auth;
pub mod chat;
pub mod comments;
pub mod flags;
pub mod health;
pub mod messages;
pub mod metrics;
pub mod portfolio;
pub mod posts;
pub mod stats;
pub mod track;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Create the combined API router with all routes under /api prefix.
///
/// Routes:
/// - GET /api/health - Health check
/// - POST /api/track/session - Start a visit session
/// - POST /api/track/event - Record a section impression
/// - POST /api/track/action - Record a discrete action
/// - POST /api/track/visit - Record a page visit for a returning visitor
/// - GET /api/portfolio - Public portfolio document
/// - GET /api/posts - Published posts
/// - GET /api/posts/:slug - One published post
/// - GET /api/posts/:slug/comments - Approved comments for a post
/// - POST /api/posts/:slug/comments - Submit a comment (pending approval)
/// - POST /api/contact - Submit a contact message
/// - GET /api/flags - Public feature flag map
/// - POST /api/chat - Ask the portfolio assistant
/// - POST /api/auth/register - Create the admin account (or invite by an admin)
/// - POST /api/auth/login - Log in, sets the auth cookie
/// - POST /api/auth/logout - Clear the auth cookie
/// - GET /api/auth/me - Current admin identity
/// - GET /api/admin/stats/dashboard - Aggregated visitor stats
/// - GET /api/admin/journeys - Recent journeys, paginated
/// - PUT /api/admin/portfolio - Replace the portfolio document
/// - GET/POST /api/admin/posts, PUT/DELETE /api/admin/posts/:id - Post CRUD
/// - GET /api/admin/comments - Moderation queue
/// - PUT /api/admin/comments/:id/approve, DELETE /api/admin/comments/:id
/// - GET /api/admin/messages, PUT /api/admin/messages/:id/read, DELETE /api/admin/messages/:id
/// - GET /api/admin/flags, PUT /api/admin/flags/:key - Feature flag admin
pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", health::router())
        .nest("/api", track::router())
        .nest("/api", portfolio::router())
        .nest("/api", posts::router())
        .nest("/api", comments::router())
        .nest("/api", messages::router())
        .nest("/api", flags::router())
        .nest("/api", chat::router())
        .nest("/api", auth::router())
        .nest("/api", stats::router())
        .with_state(state)
}
