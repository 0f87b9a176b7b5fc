// crates/server/src/main.rs
//! folio server binary.
//!
//! Opens the SQLite database, runs pending migrations, and serves the API
//! (plus the frontend bundle when one is found) until killed.

use std::net::SocketAddr;

use anyhow::Result;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use folio_db::Database;
use folio_server::{create_app_full, init_metrics, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // FOLIO_LOG controls verbosity; the startup lines below use eprintln.
    let filter = EnvFilter::try_from_env("FOLIO_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    init_metrics();

    eprintln!("\n\u{1f4d2} folio v{}\n", env!("CARGO_PKG_VERSION"));

    let config = ServerConfig::from_env();
    let db = Database::open_default().await?;

    // First run: nothing admin-side works until an account exists.
    if db.count_users().await? == 0 {
        eprintln!("  no admin account yet \u{2014} POST /api/auth/register to create one");
    }
    if let Some(dir) = &config.static_dir {
        eprintln!("  serving frontend from {}", dir.display());
    }

    let app = create_app_full(db, config.static_dir.clone());

    let addr = SocketAddr::from((config.host, config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    eprintln!("  \u{2192} http://{addr}\n");

    axum::serve(listener, app).await?;

    Ok(())
}
