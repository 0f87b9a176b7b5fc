// crates/server/src/routes/track.rs
//! Visitor tracking endpoints: session start, section events, actions, visits.
//!
//! These are the only write-heavy public routes. Event and action writes go
//! through the revision-guarded retry loop in the db layer, so concurrent
//! pings from the same browser tab never clobber each other.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::Json,
    routing::post,
    Router,
};
use chrono::Utc;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::metrics::{record_write_conflict, RequestTimer};
use crate::state::AppState;
use folio_core::{
    classify_user_agent, new_session_id, ActionRecord, EventInput, Journey, Section, VisitorStats,
};
use folio_db::{JourneyWriteError, VisitInput};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionPayload {
    pub visitor_id: String,
    pub page: String,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub referrer: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub session_id: String,
    pub section: String,
    #[serde(default)]
    pub interaction_id: Option<String>,
    /// Cumulative seconds the section has been in view.
    #[serde(default)]
    pub duration_secs: i64,
    #[serde(default)]
    pub scroll_depth: i64,
    /// Interactions since the client's last report.
    #[serde(default)]
    pub interactions: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPayload {
    pub session_id: String,
    pub action: String,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitPayload {
    pub visitor_id: String,
    pub page: String,
    #[serde(default)]
    pub referrer: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/track/session", post(start_session))
        .route("/track/event", post(record_event))
        .route("/track/action", post(record_action))
        .route("/track/visit", post(record_visit))
}

/// POST /api/track/session - Start a new browsing session.
///
/// The user agent comes from the body when the client captured it, falling
/// back to the request header. Requests with neither are rejected because
/// the device breakdown on the dashboard would silently degrade.
async fn start_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<StartSessionPayload>,
) -> ApiResult<Json<Journey>> {
    let timer = RequestTimer::new("track_session");

    let visitor_id = payload.visitor_id.trim();
    if visitor_id.is_empty() {
        timer.finish_err(400);
        return Err(ApiError::BadRequest("visitorId is required".to_string()));
    }
    let page = payload.page.trim();
    if page.is_empty() {
        timer.finish_err(400);
        return Err(ApiError::BadRequest("page is required".to_string()));
    }

    let body_ua = payload
        .user_agent
        .map(|ua| ua.trim().to_string())
        .filter(|ua| !ua.is_empty());
    let user_agent = match body_ua {
        Some(ua) => ua,
        None => match headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok()) {
            Some(ua) if !ua.trim().is_empty() => ua.to_string(),
            _ => {
                timer.finish_err(400);
                return Err(ApiError::BadRequest(
                    "userAgent is required (body field or User-Agent header)".to_string(),
                ));
            }
        },
    };

    let device = classify_user_agent(&user_agent);
    let now = Utc::now().timestamp();
    let journey = Journey::new(new_session_id(), visitor_id, page, user_agent, device, now)
        .with_referrer(payload.referrer)
        .with_location(payload.country, payload.region);

    if let Err(e) = state.db.insert_journey(&journey).await {
        tracing::error!(error = %e, "Failed to insert journey");
        timer.finish_err(500);
        return Err(e.into());
    }

    tracing::info!(
        session_id = %journey.session_id,
        visitor_id = %journey.visitor_id,
        page = %journey.landing_page,
        device = journey.device.device_type.as_str(),
        "Session started"
    );
    timer.finish_ok();
    Ok(Json(journey))
}

/// POST /api/track/event - Merge a section impression into a journey.
async fn record_event(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EventPayload>,
) -> ApiResult<Json<Journey>> {
    let timer = RequestTimer::new("track_event");

    let Some(section) = Section::parse(&payload.section) else {
        timer.finish_err(400);
        return Err(ApiError::BadRequest(format!(
            "unknown section '{}' (expected one of: {})",
            payload.section,
            Section::valid_names()
        )));
    };

    let input = EventInput {
        section,
        interaction_id: payload.interaction_id.filter(|id| !id.trim().is_empty()),
        duration_secs: payload.duration_secs.max(0),
        scroll_depth: payload.scroll_depth.clamp(0, 100),
        interactions: payload.interactions.max(0),
    };

    let now = Utc::now().timestamp();
    match state.db.record_event(&payload.session_id, &input, now).await {
        Ok(journey) => {
            timer.finish_ok();
            Ok(Json(journey))
        }
        Err(e) => {
            if matches!(e, JourneyWriteError::Conflict { .. }) {
                record_write_conflict("track_event");
                tracing::warn!(
                    session_id = %payload.session_id,
                    "Event write exhausted its conflict retries"
                );
            }
            let status = if matches!(e, JourneyWriteError::NotFound) { 404 } else { 500 };
            timer.finish_err(status);
            Err(ApiError::from_journey_write(e, &payload.session_id))
        }
    }
}

/// POST /api/track/action - Append a discrete action to a journey.
async fn record_action(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ActionPayload>,
) -> ApiResult<Json<Journey>> {
    let timer = RequestTimer::new("track_action");

    let action = payload.action.trim();
    if action.is_empty() {
        timer.finish_err(400);
        return Err(ApiError::BadRequest("action is required".to_string()));
    }

    let record = ActionRecord {
        action: action.to_string(),
        target: payload.target.filter(|t| !t.trim().is_empty()),
        detail: payload.detail.filter(|d| !d.trim().is_empty()),
        at: Utc::now().timestamp(),
    };

    match state.db.record_action(&payload.session_id, &record).await {
        Ok(journey) => {
            timer.finish_ok();
            Ok(Json(journey))
        }
        Err(e) => {
            if matches!(e, JourneyWriteError::Conflict { .. }) {
                record_write_conflict("track_action");
                tracing::warn!(
                    session_id = %payload.session_id,
                    "Action write exhausted its conflict retries"
                );
            }
            let status = if matches!(e, JourneyWriteError::NotFound) { 404 } else { 500 };
            timer.finish_err(status);
            Err(ApiError::from_journey_write(e, &payload.session_id))
        }
    }
}

/// POST /api/track/visit - Record a page visit and bump the visitor rollup.
///
/// The device label stored on the rollup is derived from the User-Agent
/// header; the visit ping itself stays minimal.
async fn record_visit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<VisitPayload>,
) -> ApiResult<Json<VisitorStats>> {
    let timer = RequestTimer::new("track_visit");

    let visitor_id = payload.visitor_id.trim();
    if visitor_id.is_empty() {
        timer.finish_err(400);
        return Err(ApiError::BadRequest("visitorId is required".to_string()));
    }
    let page = payload.page.trim();
    if page.is_empty() {
        timer.finish_err(400);
        return Err(ApiError::BadRequest("page is required".to_string()));
    }

    let device = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|ua| classify_user_agent(ua).device_type.as_str().to_string());

    let input = VisitInput {
        visitor_id: visitor_id.to_string(),
        page: page.to_string(),
        referrer: payload.referrer.filter(|r| !r.trim().is_empty()),
        display_name: payload.display_name.filter(|n| !n.trim().is_empty()),
        device,
        locale: payload.locale.filter(|l| !l.trim().is_empty()),
    };

    let now = Utc::now().timestamp();
    match state.db.record_visit(&input, now).await {
        Ok(stats) => {
            timer.finish_ok();
            Ok(Json(stats))
        }
        Err(e) => {
            tracing::error!(error = %e, visitor_id = %input.visitor_id, "Failed to record visit");
            timer.finish_err(500);
            Err(e.into())
        }
    }
}
