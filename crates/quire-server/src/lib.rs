//! HTTP server for Quire.
//!
//! This crate serves, with axum:
//! - API endpoints for page context, navigation and template lookups
//! - Operator console endpoints for menus, sections, blocks and blurbs
//! - A preview mode toggle backed by in-memory sessions
//!
//! # Quick Start
//!
//! ```ignore
//! use quire_config::Config;
//! use quire_server::{run_server, server_config_from_quire_config};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::load(None, None).unwrap();
//!     run_server(server_config_from_quire_config(&config)).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum server (quire-server)
//!                        │
//!                        ├─► /api/*      ──► Site ──► Store (SQLite)
//!                        │
//!                        └─► /console/*  ──► Site, SessionStore
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod session;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use quire_content::{ConsolePaths, Site, SiteConfig};
use quire_store_sqlite::SqliteStore;
use state::AppState;

pub use error::ServerError;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Store connection URL.
    pub database_url: String,
    /// Local database file; its directory is created on start.
    pub database_file: Option<PathBuf>,
    pub site: SiteConfig,
    /// Name of the session cookie.
    pub cookie_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7979,
            database_url: "sqlite::memory:".to_owned(),
            database_file: None,
            site: SiteConfig::default(),
            cookie_name: "quire_session".to_owned(),
        }
    }
}

/// Run the server until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(dir) = config.database_file.as_ref().and_then(|f| f.parent()) {
        tokio::fs::create_dir_all(dir).await?;
    }
    let store = SqliteStore::connect(&config.database_url).await?;
    tracing::info!(url = %config.database_url, "Opened content store");

    let site = Site::new(Arc::new(store), config.site.clone());
    let state = Arc::new(AppState::new(site, config.cookie_name.clone()));
    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        return;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from Quire config.
#[must_use]
pub fn server_config_from_quire_config(config: &quire_config::Config) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        database_url: config.database_resolved.url.clone(),
        database_file: config.database_resolved.file.clone(),
        site: SiteConfig {
            menu_base_url: config.site.menu_base_url.clone(),
            static_url: config.site.static_url.clone(),
            console: ConsolePaths::new(&config.site.console_prefix),
        },
        cookie_name: config.preview.cookie_name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_server_config_from_quire_config() {
        let mut config = quire_config::Config::default();
        config.site.console_prefix = "/admin".to_owned();
        config.preview.cookie_name = "preview".to_owned();

        let server = server_config_from_quire_config(&config);

        assert_eq!(server.port, config.server.port);
        assert_eq!(server.site.console.index(), "/admin/");
        assert_eq!(server.cookie_name, "preview");
        assert_eq!(
            server.database_file.as_deref().and_then(Path::file_name),
            Some(OsStr::new("content.db"))
        );
    }
}
