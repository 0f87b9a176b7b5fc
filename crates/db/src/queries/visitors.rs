// crates/db/src/queries/visitors.rs
// Page-view log plus the per-visitor rollup row.

use crate::{Database, DbResult};
use folio_core::VisitorStats;

use super::rows::VisitorRow;

/// One tracked page view. Optional fields only overwrite the rollup when
/// the client actually sent them.
#[derive(Debug, Clone)]
pub struct VisitInput {
    pub visitor_id: String,
    pub page: String,
    pub referrer: Option<String>,
    pub display_name: Option<String>,
    pub device: Option<String>,
    pub locale: Option<String>,
}

impl Database {
    /// Append a visit and bump the visitor rollup, returning the rollup as
    /// stored. First-time visitors get a fresh row with `visit_count = 1`.
    pub async fn record_visit(&self, input: &VisitInput, now: i64) -> DbResult<VisitorStats> {
        sqlx::query(
            r#"
            INSERT INTO visits (visitor_id, page, referrer, visited_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&input.visitor_id)
        .bind(&input.page)
        .bind(&input.referrer)
        .bind(now)
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO visitor_stats (
                visitor_id, visit_count, first_visit_at, last_visit_at,
                display_name, last_device, last_locale
            ) VALUES (?1, 1, ?2, ?2, ?3, ?4, ?5)
            ON CONFLICT(visitor_id) DO UPDATE SET
                visit_count = visitor_stats.visit_count + 1,
                last_visit_at = excluded.last_visit_at,
                display_name = COALESCE(excluded.display_name, visitor_stats.display_name),
                last_device = COALESCE(excluded.last_device, visitor_stats.last_device),
                last_locale = COALESCE(excluded.last_locale, visitor_stats.last_locale)
            "#,
        )
        .bind(&input.visitor_id)
        .bind(now)
        .bind(&input.display_name)
        .bind(&input.device)
        .bind(&input.locale)
        .execute(&self.pool)
        .await?;

        let row: VisitorRow =
            sqlx::query_as("SELECT * FROM visitor_stats WHERE visitor_id = ?1")
                .bind(&input.visitor_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(row.into_visitor_stats())
    }

    /// Fetch the rollup for one visitor.
    pub async fn get_visitor(&self, visitor_id: &str) -> DbResult<Option<VisitorStats>> {
        let row: Option<VisitorRow> =
            sqlx::query_as("SELECT * FROM visitor_stats WHERE visitor_id = ?1")
                .bind(visitor_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(VisitorRow::into_visitor_stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visit(visitor_id: &str, page: &str) -> VisitInput {
        VisitInput {
            visitor_id: visitor_id.to_string(),
            page: page.to_string(),
            referrer: None,
            display_name: None,
            device: None,
            locale: None,
        }
    }

    #[tokio::test]
    async fn test_first_visit_creates_rollup() {
        let db = crate::Database::new_in_memory().await.expect("open");

        let stats = db
            .record_visit(&visit("v-1", "/"), 1_700_000_000)
            .await
            .expect("record");

        assert_eq!(stats.visitor_id, "v-1");
        assert_eq!(stats.visit_count, 1);
        assert_eq!(stats.first_visit_at, 1_700_000_000);
        assert_eq!(stats.last_visit_at, 1_700_000_000);
        assert!(stats.display_name.is_none());
    }

    #[tokio::test]
    async fn test_repeat_visit_bumps_count_and_keeps_first_seen() {
        let db = crate::Database::new_in_memory().await.expect("open");

        db.record_visit(&visit("v-2", "/"), 1_700_000_000)
            .await
            .expect("first");
        let stats = db
            .record_visit(&visit("v-2", "/blog"), 1_700_000_500)
            .await
            .expect("second");

        assert_eq!(stats.visit_count, 2);
        assert_eq!(stats.first_visit_at, 1_700_000_000);
        assert_eq!(stats.last_visit_at, 1_700_000_500);

        let visits: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM visits")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(visits.0, 2, "every page view keeps its own row");
    }

    #[tokio::test]
    async fn test_absent_optional_fields_do_not_erase_stored_ones() {
        let db = crate::Database::new_in_memory().await.expect("open");

        let mut named = visit("v-3", "/");
        named.display_name = Some("Ada".to_string());
        named.locale = Some("en-GB".to_string());
        db.record_visit(&named, 1_700_000_000).await.expect("first");

        // A later bare ping must not wipe the name or locale.
        let stats = db
            .record_visit(&visit("v-3", "/about"), 1_700_000_100)
            .await
            .expect("second");

        assert_eq!(stats.display_name.as_deref(), Some("Ada"));
        assert_eq!(stats.last_locale.as_deref(), Some("en-GB"));
    }

    #[tokio::test]
    async fn test_get_visitor_unknown_is_none() {
        let db = crate::Database::new_in_memory().await.expect("open");
        assert!(db.get_visitor("v-none").await.expect("query").is_none());
    }
}
