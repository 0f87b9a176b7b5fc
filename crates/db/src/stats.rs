// crates/db/src/stats.rs
//! Dashboard aggregation: traffic totals, a week of daily visit counts,
//! and environment breakdowns, all computed on demand from the raw rows.

use crate::{Database, DbResult};
use chrono::{NaiveDate, Utc};
use folio_core::ContactMessage;
use serde::Serialize;
use std::collections::HashMap;
use ts_rs::TS;

/// Number of daily buckets on the dashboard, today included.
const VISIT_WINDOW_DAYS: i64 = 7;

/// Visits on one calendar day (UTC).
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct DayCount {
    /// `YYYY-MM-DD`.
    pub day: String,
    #[ts(type = "number")]
    pub count: i64,
}

/// A labelled count, used for browser and OS breakdowns.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct NameCount {
    pub name: String,
    #[ts(type = "number")]
    pub count: i64,
}

/// Everything the admin dashboard renders in one payload.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[ts(type = "number")]
    pub total_journeys: i64,
    #[ts(type = "number")]
    pub total_visits: i64,
    #[ts(type = "number")]
    pub unique_visitors: i64,
    /// Mean journey length in seconds, over journeys that recorded any time.
    #[ts(type = "number")]
    pub avg_duration_secs: i64,
    /// Trailing week of daily visit counts, oldest day first. Days with no
    /// traffic are present with a zero count so charts never have holes.
    pub visits_by_day: Vec<DayCount>,
    /// Top five browsers by journey count.
    pub top_browsers: Vec<NameCount>,
    /// Top five operating systems by journey count.
    pub top_os: Vec<NameCount>,
    /// Newest contact messages, for the inbox preview.
    pub recent_messages: Vec<ContactMessage>,
}

impl Database {
    /// Compute the dashboard payload.
    pub async fn dashboard_stats(&self) -> DbResult<DashboardStats> {
        self.dashboard_stats_at(Utc::now().date_naive()).await
    }

    /// Internal: compute the dashboard with a fixed "today", so tests can
    /// pin the visit window.
    async fn dashboard_stats_at(&self, today: NaiveDate) -> DbResult<DashboardStats> {
        let (total_journeys,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM journeys")
            .fetch_one(&self.pool)
            .await?;

        let (total_visits,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM visits")
            .fetch_one(&self.pool)
            .await?;

        let (unique_visitors,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM visitor_stats")
            .fetch_one(&self.pool)
            .await?;

        let (avg_duration_secs,): (i64,) = sqlx::query_as(
            r#"
            SELECT CAST(COALESCE(AVG(total_duration_secs), 0) AS INTEGER)
            FROM journeys WHERE total_duration_secs > 0
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let visits_by_day = self.visits_by_day(today).await?;
        let top_browsers = self.breakdown("browser").await?;
        let top_os = self.breakdown("os").await?;
        let recent_messages = self.recent_messages(5).await?;

        Ok(DashboardStats {
            total_journeys,
            total_visits,
            unique_visitors,
            avg_duration_secs,
            visits_by_day,
            top_browsers,
            top_os,
            recent_messages,
        })
    }

    /// Daily visit counts over the trailing window, zero-filled.
    async fn visits_by_day(&self, today: NaiveDate) -> DbResult<Vec<DayCount>> {
        let window_start = today - chrono::Duration::days(VISIT_WINDOW_DAYS - 1);
        let start_ts = window_start
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp();

        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT date(visited_at, 'unixepoch') AS day, COUNT(*)
            FROM visits
            WHERE visited_at >= ?1
            GROUP BY day
            "#,
        )
        .bind(start_ts)
        .fetch_all(&self.pool)
        .await?;

        let counts: HashMap<String, i64> = rows.into_iter().collect();
        let mut days = Vec::with_capacity(VISIT_WINDOW_DAYS as usize);
        for offset in 0..VISIT_WINDOW_DAYS {
            let day = (window_start + chrono::Duration::days(offset))
                .format("%Y-%m-%d")
                .to_string();
            let count = counts.get(&day).copied().unwrap_or(0);
            days.push(DayCount { day, count });
        }
        Ok(days)
    }

    /// Top five values of one journey column. `column` is a fixed name from
    /// the callers above, never user input.
    async fn breakdown(&self, column: &str) -> DbResult<Vec<NameCount>> {
        let sql = format!(
            "SELECT {column}, COUNT(*) FROM journeys \
             GROUP BY {column} ORDER BY COUNT(*) DESC, {column} ASC LIMIT 5"
        );
        let rows: Vec<(String, i64)> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|(name, count)| NameCount { name, count })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VisitInput;
    use folio_core::{classify_user_agent, Journey};

    const CHROME_WIN: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                              (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";
    const FIREFOX_MAC: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:127.0) \
                               Gecko/20100101 Firefox/127.0";

    fn journey(session_id: &str, ua: &str, duration: i64) -> Journey {
        let mut j = Journey::new(
            session_id.to_string(),
            "v-1".to_string(),
            "/".to_string(),
            ua.to_string(),
            classify_user_agent(ua),
            1_700_000_000,
        );
        j.total_duration_secs = duration;
        j
    }

    fn visit(visitor_id: &str) -> VisitInput {
        VisitInput {
            visitor_id: visitor_id.to_string(),
            page: "/".to_string(),
            referrer: None,
            display_name: None,
            device: None,
            locale: None,
        }
    }

    #[tokio::test]
    async fn test_empty_database_yields_zeroed_dashboard() {
        let db = crate::Database::new_in_memory().await.expect("open");
        let stats = db.dashboard_stats().await.expect("stats");

        assert_eq!(stats.total_journeys, 0);
        assert_eq!(stats.total_visits, 0);
        assert_eq!(stats.unique_visitors, 0);
        assert_eq!(stats.avg_duration_secs, 0);
        assert_eq!(stats.visits_by_day.len(), 7, "window is always fully laid out");
        assert!(stats.visits_by_day.iter().all(|d| d.count == 0));
        assert!(stats.top_browsers.is_empty());
        assert!(stats.recent_messages.is_empty());
    }

    #[tokio::test]
    async fn test_day_window_is_zero_filled_and_ordered() {
        let db = crate::Database::new_in_memory().await.expect("open");
        // 1_700_000_000 is 2023-11-14 UTC; pin "today" to match.
        let today = NaiveDate::from_ymd_opt(2023, 11, 14).unwrap();

        // Two visits today, one visit two days earlier, one outside the window.
        db.record_visit(&visit("v-1"), 1_700_000_000).await.unwrap();
        db.record_visit(&visit("v-1"), 1_700_000_100).await.unwrap();
        db.record_visit(&visit("v-2"), 1_700_000_000 - 2 * 86_400)
            .await
            .unwrap();
        db.record_visit(&visit("v-3"), 1_700_000_000 - 30 * 86_400)
            .await
            .unwrap();

        let stats = db.dashboard_stats_at(today).await.expect("stats");

        let days: Vec<&str> = stats.visits_by_day.iter().map(|d| d.day.as_str()).collect();
        assert_eq!(
            days,
            vec![
                "2023-11-08",
                "2023-11-09",
                "2023-11-10",
                "2023-11-11",
                "2023-11-12",
                "2023-11-13",
                "2023-11-14",
            ]
        );
        let counts: Vec<i64> = stats.visits_by_day.iter().map(|d| d.count).collect();
        assert_eq!(counts, vec![0, 0, 0, 0, 1, 0, 2]);

        // Totals include the out-of-window visit; the chart does not.
        assert_eq!(stats.total_visits, 4);
        assert_eq!(stats.unique_visitors, 3);
    }

    #[tokio::test]
    async fn test_breakdowns_rank_by_count() {
        let db = crate::Database::new_in_memory().await.expect("open");

        db.insert_journey(&journey("s-1-a", CHROME_WIN, 10)).await.unwrap();
        db.insert_journey(&journey("s-2-b", CHROME_WIN, 20)).await.unwrap();
        db.insert_journey(&journey("s-3-c", FIREFOX_MAC, 0)).await.unwrap();

        let stats = db.dashboard_stats().await.expect("stats");

        assert_eq!(stats.total_journeys, 3);
        assert_eq!(stats.top_browsers[0].name, "Chrome");
        assert_eq!(stats.top_browsers[0].count, 2);
        assert_eq!(stats.top_browsers[1].name, "Firefox");
        assert_eq!(stats.top_os[0].name, "Windows");

        // Zero-duration journeys are left out of the average.
        assert_eq!(stats.avg_duration_secs, 15);
    }

    #[tokio::test]
    async fn test_recent_messages_preview() {
        let db = crate::Database::new_in_memory().await.expect("open");
        for i in 0..7 {
            db.create_message(
                "Ada",
                "ada@example.com",
                None,
                &format!("m{i}"),
                1_700_000_000 + i,
            )
            .await
            .unwrap();
        }

        let stats = db.dashboard_stats().await.expect("stats");
        assert_eq!(stats.recent_messages.len(), 5);
        assert_eq!(stats.recent_messages[0].body, "m6");
    }
}
