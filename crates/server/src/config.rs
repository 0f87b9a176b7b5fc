// crates/server/src/config.rs
//! Server configuration from environment variables.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

/// Default port when neither `FOLIO_PORT` nor `PORT` is set.
pub const DEFAULT_PORT: u16 = 7878;

/// Runtime configuration resolved once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Directory of pre-built frontend assets, served as a fallback
    /// behind the API routes. `None` runs the server API-only.
    pub static_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Resolve configuration from the environment.
    ///
    /// `FOLIO_PORT` wins over the generic `PORT` that most hosts inject.
    /// Unparseable values fall through to the next source.
    pub fn from_env() -> Self {
        let port = std::env::var("FOLIO_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .or_else(|| std::env::var("PORT").ok().and_then(|v| v.parse().ok()))
            .unwrap_or(DEFAULT_PORT);

        let host = std::env::var("FOLIO_HOST")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));

        let static_dir = match std::env::var("FOLIO_STATIC_DIR") {
            Ok(dir) if !dir.trim().is_empty() => Some(PathBuf::from(dir)),
            _ => {
                let dist = PathBuf::from("dist");
                dist.is_dir().then_some(dist)
            }
        };

        Self {
            host,
            port,
            static_dir,
        }
    }
}
