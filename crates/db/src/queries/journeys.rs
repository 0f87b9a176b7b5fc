// crates/db/src/queries/journeys.rs
// Journey persistence: session rows plus the guarded read-modify-write
// cycle used by the event and action recorders.

use crate::{Database, DbError, DbResult};
use folio_core::{
    apply_action, apply_event, retry_on_conflict, ActionRecord, ConflictRetryError, EventInput,
    Journey, WriteAttempt,
};
use thiserror::Error;

use super::rows::JourneyRow;

/// Conflicted journey writes are retried this many times before giving up,
/// so a write gets `MAX_WRITE_RETRIES + 1` attempts in total.
pub const MAX_WRITE_RETRIES: u32 = 3;

/// Failure modes of a journey append, kept separate from [`DbError`] so
/// callers can distinguish "no such session" from a lost race.
#[derive(Debug, Error)]
pub enum JourneyWriteError {
    #[error("journey not found")]
    NotFound,

    #[error("update conflicted on all {attempts} attempts")]
    Conflict { attempts: u32 },

    #[error(transparent)]
    Db(#[from] DbError),
}

impl Database {
    /// Insert a freshly started journey. Session ids are generated, not
    /// client-supplied, so a primary-key collision is treated as an error.
    pub async fn insert_journey(&self, journey: &Journey) -> DbResult<()> {
        let events =
            serde_json::to_string(&journey.events).unwrap_or_else(|_| "[]".to_string());
        let actions =
            serde_json::to_string(&journey.actions).unwrap_or_else(|_| "[]".to_string());

        sqlx::query(
            r#"
            INSERT INTO journeys (
                session_id, visitor_id, landing_page, referrer,
                user_agent, device_type, os, browser,
                country, region,
                started_at, ended_at, total_duration_secs,
                events, actions, revision
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6, ?7, ?8,
                ?9, ?10,
                ?11, ?12, ?13,
                ?14, ?15, ?16
            )
            "#,
        )
        .bind(&journey.session_id)
        .bind(&journey.visitor_id)
        .bind(&journey.landing_page)
        .bind(&journey.referrer)
        .bind(&journey.user_agent)
        .bind(journey.device.device_type.as_str())
        .bind(&journey.device.os)
        .bind(&journey.device.browser)
        .bind(&journey.country)
        .bind(&journey.region)
        .bind(journey.started_at)
        .bind(journey.ended_at)
        .bind(journey.total_duration_secs)
        .bind(events)
        .bind(actions)
        .bind(journey.revision)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch a single journey by session id.
    pub async fn get_journey(&self, session_id: &str) -> DbResult<Option<Journey>> {
        let row: Option<JourneyRow> =
            sqlx::query_as("SELECT * FROM journeys WHERE session_id = ?1")
                .bind(session_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(JourneyRow::into_journey))
    }

    /// Write back a modified journey, guarded by its revision.
    ///
    /// The row is only updated when the stored revision still matches
    /// `journey.revision`; the stored revision is bumped in the same
    /// statement. Returns `false` when a concurrent writer got there first,
    /// in which case the caller re-reads and reapplies.
    pub async fn update_journey_guarded(&self, journey: &Journey) -> DbResult<bool> {
        let events =
            serde_json::to_string(&journey.events).unwrap_or_else(|_| "[]".to_string());
        let actions =
            serde_json::to_string(&journey.actions).unwrap_or_else(|_| "[]".to_string());

        let result = sqlx::query(
            r#"
            UPDATE journeys SET
                ended_at = ?1,
                total_duration_secs = ?2,
                events = ?3,
                actions = ?4,
                revision = revision + 1
            WHERE session_id = ?5 AND revision = ?6
            "#,
        )
        .bind(journey.ended_at)
        .bind(journey.total_duration_secs)
        .bind(events)
        .bind(actions)
        .bind(&journey.session_id)
        .bind(journey.revision)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List journeys, newest first.
    pub async fn recent_journeys(&self, limit: i64, offset: i64) -> DbResult<Vec<Journey>> {
        let rows: Vec<JourneyRow> = sqlx::query_as(
            "SELECT * FROM journeys ORDER BY started_at DESC LIMIT ?1 OFFSET ?2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(JourneyRow::into_journey).collect())
    }

    /// Merge a section impression into a journey and persist it.
    ///
    /// Runs the full read-merge-write cycle under [`retry_on_conflict`]: a
    /// lost revision race re-reads the fresh row and reapplies the input, so
    /// no concurrent write is ever overwritten. Returns the journey as
    /// committed.
    pub async fn record_event(
        &self,
        session_id: &str,
        input: &EventInput,
        now: i64,
    ) -> Result<Journey, JourneyWriteError> {
        retry_on_conflict(MAX_WRITE_RETRIES, || {
            let db = self.clone();
            let session_id = session_id.to_string();
            let input = input.clone();
            async move {
                let mut journey = db
                    .get_journey(&session_id)
                    .await?
                    .ok_or(JourneyWriteError::NotFound)?;
                apply_event(&mut journey, &input, now);
                if db.update_journey_guarded(&journey).await? {
                    journey.revision += 1;
                    Ok(WriteAttempt::Committed(journey))
                } else {
                    Ok(WriteAttempt::Conflicted)
                }
            }
        })
        .await
        .map_err(flatten_retry_error)
    }

    /// Append a discrete action to a journey and persist it, with the same
    /// conflict-retry behavior as [`Database::record_event`].
    pub async fn record_action(
        &self,
        session_id: &str,
        action: &ActionRecord,
    ) -> Result<Journey, JourneyWriteError> {
        retry_on_conflict(MAX_WRITE_RETRIES, || {
            let db = self.clone();
            let session_id = session_id.to_string();
            let action = action.clone();
            async move {
                let mut journey = db
                    .get_journey(&session_id)
                    .await?
                    .ok_or(JourneyWriteError::NotFound)?;
                apply_action(&mut journey, action);
                if db.update_journey_guarded(&journey).await? {
                    journey.revision += 1;
                    Ok(WriteAttempt::Committed(journey))
                } else {
                    Ok(WriteAttempt::Conflicted)
                }
            }
        })
        .await
        .map_err(flatten_retry_error)
    }
}

fn flatten_retry_error(err: ConflictRetryError<JourneyWriteError>) -> JourneyWriteError {
    match err {
        ConflictRetryError::Exhausted { attempts } => JourneyWriteError::Conflict { attempts },
        ConflictRetryError::Inner(inner) => inner,
    }
}
