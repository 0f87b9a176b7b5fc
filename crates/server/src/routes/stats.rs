//! Admin dashboard statistics and journey inspection endpoints.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::auth::AdminClaims;
use crate::error::ApiResult;
use crate::metrics::record_request;
use crate::state::AppState;
use folio_core::Journey;
use folio_db::DashboardStats;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

/// Query parameters for the journeys listing.
#[derive(Debug, Deserialize)]
pub struct JourneysQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// One page of recent journeys, newest first.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct JourneysPage {
    pub journeys: Vec<Journey>,
    #[ts(type = "number")]
    pub limit: i64,
    #[ts(type = "number")]
    pub offset: i64,
}

/// GET /api/admin/stats/dashboard - Aggregated visitor statistics.
///
/// Returns totals, the zero-filled seven-day visit series, top browser and
/// OS breakdowns, and the latest contact messages.
pub async fn dashboard_stats(
    claims: AdminClaims,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<DashboardStats>> {
    let start = Instant::now();

    let stats = match state.db.dashboard_stats().await {
        Ok(stats) => stats,
        Err(e) => {
            tracing::error!(
                endpoint = "dashboard_stats",
                error = %e,
                "Failed to compute dashboard stats"
            );
            record_request("dashboard_stats", "500", start.elapsed());
            return Err(e.into());
        }
    };

    tracing::debug!(admin = %claims.username, "Dashboard stats served");
    record_request("dashboard_stats", "200", start.elapsed());
    Ok(Json(stats))
}

/// GET /api/admin/journeys?limit=20&offset=0 - Recent journeys, paginated.
pub async fn list_journeys(
    _claims: AdminClaims,
    State(state): State<Arc<AppState>>,
    Query(query): Query<JourneysQuery>,
) -> ApiResult<Json<JourneysPage>> {
    let start = Instant::now();

    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0).max(0);

    match state.db.recent_journeys(limit, offset).await {
        Ok(journeys) => {
            record_request("admin_journeys", "200", start.elapsed());
            Ok(Json(JourneysPage {
                journeys,
                limit,
                offset,
            }))
        }
        Err(e) => {
            tracing::error!(
                endpoint = "admin_journeys",
                error = %e,
                "Failed to list journeys"
            );
            record_request("admin_journeys", "500", start.elapsed());
            Err(e.into())
        }
    }
}

/// Create the admin stats routes router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/stats/dashboard", get(dashboard_stats))
        .route("/admin/journeys", get(list_journeys))
}
