// crates/core/src/retry.rs
//! Bounded retry for optimistic-concurrency writes.
//!
//! Journey updates are read-merge-write against a revision column. When a
//! concurrent writer advances the revision between the read and the write,
//! the write affects zero rows and the whole closure is re-run against
//! fresh data. The budget is small and fixed: conflicts on a personal site
//! are momentary (two tabs, a slow network retry), so anything persistent
//! is a bug worth surfacing, not worth hiding behind backoff.

use std::future::Future;

use thiserror::Error;

/// Outcome of a single read-merge-write attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteAttempt<T> {
    /// The guarded write landed.
    Committed(T),
    /// A concurrent writer advanced the revision first; re-read and retry.
    Conflicted,
}

/// Error from [`retry_on_conflict`].
#[derive(Debug, Error)]
pub enum ConflictRetryError<E> {
    /// Every attempt observed a concurrent writer.
    #[error("update conflicted on all {attempts} attempts")]
    Exhausted { attempts: u32 },

    /// The operation itself failed. Not retried.
    #[error("{0}")]
    Inner(E),
}

/// Run `op` until it commits, retrying on conflict up to `max_retries`
/// times after the initial attempt.
///
/// `op` must re-read current state on each call; retrying a stale merge
/// would just conflict again. Real errors abort immediately. After the
/// budget is spent the caller gets `Exhausted` with the total attempt
/// count.
pub async fn retry_on_conflict<T, E, F, Fut>(
    max_retries: u32,
    mut op: F,
) -> Result<T, ConflictRetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<WriteAttempt<T>, E>>,
{
    let attempts = max_retries + 1;
    for attempt in 1..=attempts {
        match op().await {
            Ok(WriteAttempt::Committed(value)) => return Ok(value),
            Ok(WriteAttempt::Conflicted) => {
                if attempt < attempts {
                    tracing::debug!(attempt, "optimistic write conflicted, retrying");
                }
            }
            Err(e) => return Err(ConflictRetryError::Inner(e)),
        }
    }
    Err(ConflictRetryError::Exhausted { attempts })
}
