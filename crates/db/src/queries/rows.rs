// crates/db/src/queries/rows.rs
// Internal row types bridging raw SQLite rows to core domain types.
// Needed because the domain types live in folio-core, which has no sqlx
// dependency; the JSON columns are parsed here.

use folio_core::{
    ActionRecord, Comment, ContactMessage, DeviceInfo, DeviceType, FeatureFlag, Journey, Post,
    SectionImpression, VisitorStats,
};
use sqlx::Row;

#[derive(Debug)]
pub(crate) struct JourneyRow {
    session_id: String,
    visitor_id: String,
    landing_page: String,
    referrer: Option<String>,
    user_agent: String,
    device_type: String,
    os: String,
    browser: String,
    country: Option<String>,
    region: Option<String>,
    started_at: i64,
    ended_at: Option<i64>,
    total_duration_secs: i64,
    events: String,
    actions: String,
    revision: i64,
}

impl<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> for JourneyRow {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            session_id: row.try_get("session_id")?,
            visitor_id: row.try_get("visitor_id")?,
            landing_page: row.try_get("landing_page")?,
            referrer: row.try_get("referrer")?,
            user_agent: row.try_get("user_agent")?,
            device_type: row.try_get("device_type")?,
            os: row.try_get("os")?,
            browser: row.try_get("browser")?,
            country: row.try_get("country")?,
            region: row.try_get("region")?,
            started_at: row.try_get("started_at")?,
            ended_at: row.try_get("ended_at")?,
            total_duration_secs: row.try_get("total_duration_secs")?,
            events: row.try_get("events")?,
            actions: row.try_get("actions")?,
            revision: row.try_get("revision")?,
        })
    }
}

impl JourneyRow {
    pub(crate) fn into_journey(self) -> Journey {
        // Malformed JSON degrades to an empty list rather than failing reads.
        let events: Vec<SectionImpression> = serde_json::from_str(&self.events).unwrap_or_default();
        let actions: Vec<ActionRecord> = serde_json::from_str(&self.actions).unwrap_or_default();
        Journey {
            session_id: self.session_id,
            visitor_id: self.visitor_id,
            landing_page: self.landing_page,
            referrer: self.referrer,
            user_agent: self.user_agent,
            device: DeviceInfo {
                device_type: DeviceType::parse(&self.device_type),
                os: self.os,
                browser: self.browser,
            },
            country: self.country,
            region: self.region,
            started_at: self.started_at,
            ended_at: self.ended_at,
            total_duration_secs: self.total_duration_secs,
            events,
            actions,
            revision: self.revision,
        }
    }
}

#[derive(Debug)]
pub(crate) struct VisitorRow {
    visitor_id: String,
    visit_count: i64,
    first_visit_at: i64,
    last_visit_at: i64,
    display_name: Option<String>,
    last_device: Option<String>,
    last_locale: Option<String>,
}

impl<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> for VisitorRow {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            visitor_id: row.try_get("visitor_id")?,
            visit_count: row.try_get("visit_count")?,
            first_visit_at: row.try_get("first_visit_at")?,
            last_visit_at: row.try_get("last_visit_at")?,
            display_name: row.try_get("display_name")?,
            last_device: row.try_get("last_device")?,
            last_locale: row.try_get("last_locale")?,
        })
    }
}

impl VisitorRow {
    pub(crate) fn into_visitor_stats(self) -> VisitorStats {
        VisitorStats {
            visitor_id: self.visitor_id,
            visit_count: self.visit_count,
            first_visit_at: self.first_visit_at,
            last_visit_at: self.last_visit_at,
            display_name: self.display_name,
            last_device: self.last_device,
            last_locale: self.last_locale,
        }
    }
}

#[derive(Debug)]
pub(crate) struct PostRow {
    id: String,
    slug: String,
    title: String,
    summary: String,
    body: String,
    tags: String,
    published: bool,
    created_at: i64,
    updated_at: i64,
}

impl<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> for PostRow {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            slug: row.try_get("slug")?,
            title: row.try_get("title")?,
            summary: row.try_get("summary")?,
            body: row.try_get("body")?,
            tags: row.try_get("tags")?,
            published: row.try_get("published")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl PostRow {
    pub(crate) fn into_post(self) -> Post {
        let tags: Vec<String> = serde_json::from_str(&self.tags).unwrap_or_default();
        Post {
            id: self.id,
            slug: self.slug,
            title: self.title,
            summary: self.summary,
            body: self.body,
            tags,
            published: self.published,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug)]
pub(crate) struct CommentRow {
    id: String,
    post_id: String,
    author: String,
    body: String,
    approved: bool,
    created_at: i64,
}

impl<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> for CommentRow {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            post_id: row.try_get("post_id")?,
            author: row.try_get("author")?,
            body: row.try_get("body")?,
            approved: row.try_get("approved")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl CommentRow {
    pub(crate) fn into_comment(self) -> Comment {
        Comment {
            id: self.id,
            post_id: self.post_id,
            author: self.author,
            body: self.body,
            approved: self.approved,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug)]
pub(crate) struct MessageRow {
    id: String,
    name: String,
    email: String,
    subject: Option<String>,
    body: String,
    read: bool,
    received_at: i64,
}

impl<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> for MessageRow {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            subject: row.try_get("subject")?,
            body: row.try_get("body")?,
            read: row.try_get("read")?,
            received_at: row.try_get("received_at")?,
        })
    }
}

impl MessageRow {
    pub(crate) fn into_message(self) -> ContactMessage {
        ContactMessage {
            id: self.id,
            name: self.name,
            email: self.email,
            subject: self.subject,
            body: self.body,
            read: self.read,
            received_at: self.received_at,
        }
    }
}

#[derive(Debug)]
pub(crate) struct FlagRow {
    key: String,
    enabled: bool,
    note: Option<String>,
    updated_at: i64,
}

impl<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> for FlagRow {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            key: row.try_get("key")?,
            enabled: row.try_get("enabled")?,
            note: row.try_get("note")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl FlagRow {
    pub(crate) fn into_flag(self) -> FeatureFlag {
        FeatureFlag {
            key: self.key,
            enabled: self.enabled,
            note: self.note,
            updated_at: self.updated_at,
        }
    }
}
