// crates/db/src/queries/flags.rs
// Feature flags gate optional frontend surfaces (chat widget, comments,
// visual toys). Unknown keys read as disabled.

use crate::{Database, DbResult};
use folio_core::FeatureFlag;

use super::rows::FlagRow;

impl Database {
    pub async fn list_flags(&self) -> DbResult<Vec<FeatureFlag>> {
        let rows: Vec<FlagRow> = sqlx::query_as("SELECT * FROM feature_flags ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(FlagRow::into_flag).collect())
    }

    pub async fn flag_enabled(&self, key: &str) -> DbResult<bool> {
        let row: Option<(bool,)> =
            sqlx::query_as("SELECT enabled FROM feature_flags WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(enabled,)| enabled).unwrap_or(false))
    }

    /// Create or update a flag. An absent `note` keeps the stored one.
    pub async fn set_flag(
        &self,
        key: &str,
        enabled: bool,
        note: Option<&str>,
        now: i64,
    ) -> DbResult<FeatureFlag> {
        sqlx::query(
            r#"
            INSERT INTO feature_flags (key, enabled, note, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(key) DO UPDATE SET
                enabled = excluded.enabled,
                note = COALESCE(excluded.note, feature_flags.note),
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(enabled)
        .bind(note)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let row: FlagRow = sqlx::query_as("SELECT * FROM feature_flags WHERE key = ?1")
            .bind(key)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into_flag())
    }
}
