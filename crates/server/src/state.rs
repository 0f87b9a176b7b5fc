// crates/server/src/state.rs
//! Application state for the Axum server.

use crate::auth::AuthKeys;
use folio_core::{ApiProvider, AssistantProvider};
use folio_db::Database;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    /// Server start time for uptime tracking.
    pub start_time: Instant,
    /// Database handle for journeys, content, and visitor stats.
    pub db: Database,
    /// JWT keys for admin authentication.
    pub auth: AuthKeys,
    /// Chat assistant backend. `None` when no API key is configured;
    /// the chat route then answers from the built-in fallback.
    pub assistant: Option<Arc<dyn AssistantProvider>>,
}

impl AppState {
    /// Create a new application state wrapped in an Arc for sharing.
    ///
    /// Auth keys and the assistant provider are read from the environment.
    pub fn new(db: Database) -> Arc<Self> {
        let assistant = ApiProvider::from_env()
            .map(|provider| Arc::new(provider) as Arc<dyn AssistantProvider>);
        Arc::new(Self {
            start_time: Instant::now(),
            db,
            auth: AuthKeys::from_env(),
            assistant,
        })
    }

    /// Create with an explicit assistant provider (for testing).
    pub fn with_assistant(db: Database, assistant: Arc<dyn AssistantProvider>) -> Arc<Self> {
        Arc::new(Self {
            start_time: Instant::now(),
            db,
            auth: AuthKeys::from_env(),
            assistant: Some(assistant),
        })
    }

    /// Get the server uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    /// Helper to create an AppState with an in-memory database for testing.
    async fn test_state() -> Arc<AppState> {
        let db = Database::new_in_memory().await.expect("in-memory DB");
        AppState::new(db)
    }

    #[tokio::test]
    async fn test_app_state_new() {
        let state = test_state().await;
        assert!(state.uptime_secs() < 1);
    }

    #[tokio::test]
    async fn test_app_state_uptime() {
        let state = test_state().await;
        sleep(Duration::from_millis(100));
        // Should be at least 0 seconds (could be 0 due to timing)
        let uptime = state.uptime_secs();
        assert!(uptime < 5); // Reasonable upper bound
    }

    #[tokio::test]
    async fn test_app_state_clone() {
        let state = test_state().await;
        let cloned = state.clone();
        // Both should report similar uptime
        assert_eq!(state.uptime_secs(), cloned.uptime_secs());
    }
}
