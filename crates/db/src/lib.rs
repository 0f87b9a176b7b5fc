// crates/db/src/lib.rs
// SQLite persistence for the folio server: journeys, visitors, content, flags.

mod migrations;
mod queries;
pub mod stats;

pub use queries::journeys::{JourneyWriteError, MAX_WRITE_RETRIES};
pub use queries::posts::{NewPost, PostUpdate};
pub use queries::users::AdminAccount;
pub use queries::visitors::VisitInput;
pub use stats::{DashboardStats, DayCount, NameCount};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{ConnectOptions, SqlitePool};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Failed to create database directory: {0}")]
    CreateDir(#[from] std::io::Error),
}

pub type DbResult<T> = Result<T, DbError>;

/// Main database handle wrapping a SQLite connection pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    db_path: PathBuf,
}

impl Database {
    /// Open (or create) the database at the given path and run migrations.
    pub async fn new(path: &Path) -> DbResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(30))
            .log_slow_statements(
                tracing::log::LevelFilter::Warn,
                std::time::Duration::from_secs(5),
            );

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        let db = Self {
            pool,
            db_path: path.to_owned(),
        };
        db.run_migrations().await?;

        info!("Database opened at {}", path.display());
        Ok(db)
    }

    /// Create an in-memory database (for testing).
    ///
    /// Uses `shared_cache(true)` so all pool connections share the same
    /// in-memory database. Without this, each connection gets its own
    /// separate database, breaking concurrent queries.
    pub async fn new_in_memory() -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?
            .shared_cache(true)
            .busy_timeout(std::time::Duration::from_secs(5));
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;
        let db = Self {
            pool,
            db_path: PathBuf::new(),
        };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Open the database at the default location.
    ///
    /// Respects `FOLIO_DB` when set, otherwise uses `folio.db` in the
    /// working directory.
    pub async fn open_default() -> DbResult<Self> {
        let path = default_db_path();
        Self::new(&path).await
    }

    /// Run all inline migrations.
    ///
    /// Uses a `_migrations` table to track which migrations have already been
    /// applied, so each statement runs exactly once over the lifetime of a
    /// database file. The schema is fixed at startup; nothing mutates it at
    /// runtime.
    async fn run_migrations(&self) -> DbResult<()> {
        // Ensure the migration-tracking table exists
        sqlx::query("CREATE TABLE IF NOT EXISTS _migrations (version INTEGER PRIMARY KEY)")
            .execute(&self.pool)
            .await?;

        // Find the highest version already applied (0 if none)
        let row: (i64,) = sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM _migrations")
            .fetch_one(&self.pool)
            .await?;
        let current_version = row.0 as usize;

        // Run only new migrations
        for (i, migration) in migrations::MIGRATIONS.iter().enumerate() {
            let version = i + 1; // 1-based
            if version > current_version {
                sqlx::query(migration).execute(&self.pool).await?;
                sqlx::query("INSERT INTO _migrations (version) VALUES (?)")
                    .bind(version as i64)
                    .execute(&self.pool)
                    .await?;
            }
        }

        Ok(())
    }

    /// Liveness probe: runs a trivial query against the pool.
    pub async fn ping(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get the path to the database file.
    /// Returns an empty path for in-memory databases.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

/// Returns the database path: `$FOLIO_DB` when set, otherwise `./folio.db`.
pub fn default_db_path() -> PathBuf {
    std::env::var("FOLIO_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("folio.db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_database() {
        // Open in-memory DB, run migrations, verify no errors
        let db = Database::new_in_memory()
            .await
            .expect("should create in-memory database");

        // Verify journeys table exists by querying it
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM journeys")
            .fetch_one(db.pool())
            .await
            .expect("journeys table should exist");
        assert_eq!(count.0, 0);

        // Verify posts table exists
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts")
            .fetch_one(db.pool())
            .await
            .expect("posts table should exist");
        assert_eq!(count.0, 0);
    }

    #[tokio::test]
    async fn test_migrations_idempotent() {
        // Run migrations twice — should not error
        let db = Database::new_in_memory()
            .await
            .expect("first open should succeed");

        // Run migrations again explicitly
        db.run_migrations()
            .await
            .expect("second migration run should succeed");

        // Still works
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM journeys")
            .fetch_one(db.pool())
            .await
            .expect("journeys table should still exist");
        assert_eq!(count.0, 0);
    }

    #[tokio::test]
    async fn test_file_based_database() {
        let tmp = tempfile::tempdir().expect("should create temp dir");
        let db_path = tmp.path().join("folio.db");

        let db = Database::new(&db_path)
            .await
            .expect("should create file-based database");

        // Verify table exists
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM journeys")
            .fetch_one(db.pool())
            .await
            .expect("journeys table should exist");
        assert_eq!(count.0, 0);

        assert!(db_path.exists(), "database file should be created on disk");
    }

    #[tokio::test]
    async fn test_flag_seeds_present() {
        let db = Database::new_in_memory().await.expect("open");

        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM feature_flags WHERE key = 'chat' AND enabled = 1")
                .fetch_one(db.pool())
                .await
                .expect("feature_flags table should exist");
        assert_eq!(row.0, 1, "chat flag should be seeded enabled");
    }

    #[tokio::test]
    async fn test_portfolio_singleton_seeded() {
        let db = Database::new_in_memory().await.expect("open");

        let row: (i64, String) = sqlx::query_as("SELECT id, doc FROM portfolio")
            .fetch_one(db.pool())
            .await
            .expect("portfolio row should be seeded");
        assert_eq!(row.0, 1);
        assert_eq!(row.1, "{}");
    }

    #[test]
    fn test_default_db_path() {
        let path = default_db_path();
        assert!(path.to_string_lossy().ends_with("folio.db"));
    }
}
