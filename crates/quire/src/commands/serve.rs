//! `quire serve` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use quire_config::{CliSettings, Config};
use quire_server::{run_server, server_config_from_quire_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover quire.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Database URL (overrides config).
    #[arg(long, env = "QUIRE_DATABASE_URL")]
    database_url: Option<String>,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            database_url: self.database_url,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        if let Some(dir) = config.database_resolved.file.as_deref().and_then(Path::parent) {
            ensure_data_dir(dir)?;
        }

        output.highlight(&format!(
            "Starting server on {}:{}",
            config.server.host, config.server.port
        ));
        output.info(&format!("Database: {}", config.database_resolved.url));
        output.info(&format!("Console: {}/", config.site.console_prefix));
        if let Some(path) = &config.config_path {
            output.info(&format!("Config: {}", path.display()));
        } else {
            output.warning("No quire.toml found, using defaults");
        }

        run_server(server_config_from_quire_config(&config))
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }
}

/// Ensure the database directory exists; a `.quire/` directory also gets a
/// `.gitignore`.
fn ensure_data_dir(dir: &Path) -> Result<(), CliError> {
    std::fs::create_dir_all(dir)?;

    if dir.file_name().is_some_and(|name| name == ".quire") {
        let gitignore_path = dir.join(".gitignore");
        if !gitignore_path.exists() {
            let _ = std::fs::write(&gitignore_path, "# Automatically created by quire\n*\n");
        }
    }

    Ok(())
}
