// crates/db/src/queries/portfolio.rs
// The portfolio document is a singleton row; edits replace the whole JSON
// blob so the admin editor never has to diff fields.

use crate::{Database, DbResult};
use folio_core::PortfolioDoc;

impl Database {
    /// Fetch the portfolio document and its last-updated timestamp.
    /// A missing or unparsable blob degrades to the empty document.
    pub async fn get_portfolio(&self) -> DbResult<(PortfolioDoc, i64)> {
        let row: Option<(String, i64)> =
            sqlx::query_as("SELECT doc, updated_at FROM portfolio WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;

        Ok(match row {
            Some((doc, updated_at)) => {
                (serde_json::from_str(&doc).unwrap_or_default(), updated_at)
            }
            None => (PortfolioDoc::default(), 0),
        })
    }

    /// Replace the portfolio document.
    pub async fn save_portfolio(&self, doc: &PortfolioDoc, now: i64) -> DbResult<()> {
        let blob = serde_json::to_string(doc).unwrap_or_else(|_| "{}".to_string());

        sqlx::query(
            r#"
            INSERT INTO portfolio (id, doc, updated_at) VALUES (1, ?1, ?2)
            ON CONFLICT(id) DO UPDATE SET
                doc = excluded.doc,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(blob)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
