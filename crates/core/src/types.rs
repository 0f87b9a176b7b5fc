// crates/core/src/types.rs
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::device::DeviceInfo;
use crate::section::Section;

/// One merged view of a page section within a journey.
///
/// A journey holds at most one impression per interaction id, and at most
/// one id-less impression per section. Repeated events for the same key
/// merge into the existing impression instead of appending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct SectionImpression {
    pub section: Section,
    /// Client-generated dedup key. Events without one merge by section only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_id: Option<String>,
    /// Unix seconds of the first event for this impression.
    pub viewed_at: i64,
    /// Cumulative seconds in view, as last reported by the client.
    pub duration_secs: i64,
    /// Deepest scroll position reached, 0-100.
    pub scroll_depth: i64,
    /// Total interactions (clicks, hovers) recorded against this section.
    pub interaction_count: i64,
}

/// A discrete visitor action (click, download, theme toggle, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Unix seconds.
    pub at: i64,
}

/// A visitor's journey through the site: one row per browsing session.
///
/// `total_duration_secs` is always `ended_at - started_at` as of the last
/// recorded event. It is recomputed on every write, never accumulated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct Journey {
    pub session_id: String,
    pub visitor_id: String,
    pub landing_page: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    pub user_agent: String,
    #[serde(flatten)]
    pub device: DeviceInfo,
    /// Coarse location, only present when the client supplies it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Unix seconds.
    pub started_at: i64,
    /// Unix seconds of the last recorded event. None until an event arrives.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<i64>,
    pub total_duration_secs: i64,
    pub events: Vec<SectionImpression>,
    pub actions: Vec<ActionRecord>,
    /// Optimistic concurrency counter, bumped on every successful update.
    pub revision: i64,
}

impl Journey {
    /// Create a fresh journey with empty event and action lists.
    pub fn new(
        session_id: impl Into<String>,
        visitor_id: impl Into<String>,
        landing_page: impl Into<String>,
        user_agent: impl Into<String>,
        device: DeviceInfo,
        started_at: i64,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            visitor_id: visitor_id.into(),
            landing_page: landing_page.into(),
            referrer: None,
            user_agent: user_agent.into(),
            device,
            country: None,
            region: None,
            started_at,
            ended_at: None,
            total_duration_secs: 0,
            events: Vec::new(),
            actions: Vec::new(),
            revision: 0,
        }
    }

    pub fn with_referrer(mut self, referrer: Option<String>) -> Self {
        self.referrer = referrer.filter(|r| !r.is_empty());
        self
    }

    pub fn with_location(mut self, country: Option<String>, region: Option<String>) -> Self {
        self.country = country.filter(|c| !c.is_empty());
        self.region = region.filter(|r| !r.is_empty());
        self
    }
}

/// Per-visitor rollup, upserted on every tracked visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct VisitorStats {
    pub visitor_id: String,
    pub visit_count: i64,
    pub first_visit_at: i64,
    pub last_visit_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_device: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_locale: Option<String>,
}

/// A blog post. Drafts (`published == false`) are only visible to admins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub body: String,
    pub tags: Vec<String>,
    pub published: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A comment on a blog post. Held for moderation until approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    pub author: String,
    pub body: String,
    pub approved: bool,
    pub created_at: i64,
}

/// A message submitted through the contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub body: String,
    pub read: bool,
    pub received_at: i64,
}

/// A client-facing feature toggle (chat widget, comments, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct FeatureFlag {
    pub key: String,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub updated_at: i64,
}

/// One project card on the portfolio page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectEntry {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
}

/// One entry in the experience timeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceEntry {
    pub company: String,
    pub role: String,
    /// Display strings ("2023-04", "present"), not parsed dates.
    pub start: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    pub summary: String,
}

/// The portfolio content document. Stored as a single JSON blob and
/// replaced wholesale on admin edits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "camelCase", default)]
pub struct PortfolioDoc {
    pub name: String,
    pub headline: String,
    pub about: String,
    pub skills: Vec<String>,
    pub projects: Vec<ProjectEntry>,
    pub experience: Vec<ExperienceEntry>,
    /// Social links keyed by platform ("github", "linkedin", ...).
    pub socials: std::collections::BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{classify_user_agent, DeviceType};

    #[test]
    fn test_journey_serializes_to_camel_case() {
        let device = classify_user_agent("Mozilla/5.0 (Windows NT 10.0) Chrome/120.0");
        let journey = Journey::new("s-1-abc", "v-1", "/", "UA", device, 1000)
            .with_referrer(Some("https://news.ycombinator.com".to_string()));

        let json = serde_json::to_string(&journey).unwrap();
        assert!(json.contains("\"sessionId\":\"s-1-abc\""));
        assert!(json.contains("\"visitorId\":\"v-1\""));
        assert!(json.contains("\"totalDurationSecs\":0"));
        assert!(json.contains("\"deviceType\":\"desktop\""));
        // ended_at is None until the first event, and skipped when absent
        assert!(!json.contains("endedAt"));
    }

    #[test]
    fn test_journey_round_trip() {
        let device = classify_user_agent("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Mobile Safari/604.1");
        let journey = Journey::new("s-2-xyz", "v-2", "/blog", "UA", device, 2000)
            .with_location(Some("DE".to_string()), None);

        let json = serde_json::to_string(&journey).unwrap();
        let back: Journey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, journey);
        assert_eq!(back.device.device_type, DeviceType::Mobile);
        assert_eq!(back.country.as_deref(), Some("DE"));
    }

    #[test]
    fn test_with_referrer_drops_empty_string() {
        let device = classify_user_agent("");
        let journey =
            Journey::new("s", "v", "/", "", device, 0).with_referrer(Some(String::new()));
        assert!(journey.referrer.is_none());
    }

    #[test]
    fn test_portfolio_doc_parses_empty_object() {
        // The portfolio row is seeded with '{}'; every field must default.
        let doc: PortfolioDoc = serde_json::from_str("{}").unwrap();
        assert_eq!(doc, PortfolioDoc::default());
    }

    #[test]
    fn test_impression_optional_fields_skipped() {
        let imp = SectionImpression {
            section: Section::Hero,
            interaction_id: None,
            viewed_at: 100,
            duration_secs: 5,
            scroll_depth: 40,
            interaction_count: 0,
        };
        let json = serde_json::to_string(&imp).unwrap();
        assert!(json.contains("\"section\":\"hero\""));
        assert!(!json.contains("interactionId"));
    }
}
