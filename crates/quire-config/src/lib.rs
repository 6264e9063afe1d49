//! Configuration management for Quire.
//!
//! Parses `quire.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `database.url`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
#[derive(Debug, Default)]
pub struct CliSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Override the database URL; wins over both `database.url` and `database.path`.
    pub database_url: Option<String>,
}

const CONFIG_FILENAME: &str = "quire.toml";

/// Project data directory, next to the config file.
const PROJECT_DIR: &str = ".quire";

const DATABASE_FILENAME: &str = "content.db";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    /// Database location as written in TOML.
    database: DatabaseConfigRaw,
    pub site: SiteConfig,
    pub preview: PreviewConfig,

    /// Resolved database configuration (set after loading).
    #[serde(skip)]
    pub database_resolved: DatabaseConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7979,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DatabaseConfigRaw {
    /// Full connection URL, used as is.
    url: Option<String>,
    /// SQLite file, relative to the config file.
    path: Option<String>,
}

/// Resolved database configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Connection URL handed to the store.
    pub url: String,
    /// Local database file, when the URL points at one.
    pub file: Option<PathBuf>,
}

impl DatabaseConfig {
    fn for_file(file: PathBuf) -> Self {
        Self {
            url: format!("sqlite://{}", file.display()),
            file: Some(file),
        }
    }

    fn for_url(url: String) -> Self {
        let file = sqlite_file(&url);
        Self { url, file }
    }
}

/// File path of a `sqlite:` URL; `None` for in-memory databases.
fn sqlite_file(url: &str) -> Option<PathBuf> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(PathBuf::from(path))
}

/// Site layout configuration.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SiteConfig {
    /// Base URL menu links are joined onto.
    pub menu_base_url: String,
    /// Prefix of uploaded and static files, used for image blurb sources.
    pub static_url: String,
    /// Mount point of the operator console.
    pub console_prefix: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            menu_base_url: "/".to_owned(),
            static_url: "/static".to_owned(),
            console_prefix: "/console".to_owned(),
        }
    }
}

/// Preview mode configuration.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PreviewConfig {
    /// Name of the session cookie carrying the preview flag.
    pub cookie_name: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            cookie_name: "quire_session".to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`database.url`").
        field: String,
        /// Error message (e.g., "${`DATABASE_URL`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require an absolute URL path without a trailing slash.
fn require_url_prefix(value: &str, field: &str) -> Result<(), ConfigError> {
    if !value.starts_with('/') || value.len() < 2 || value.ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "{field} must start with / and must not end with /"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `quire.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(url) = &settings.database_url {
            self.database_resolved = DatabaseConfig::for_url(url.clone());
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::discover_from(&current)
    }

    fn discover_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILENAME))
            .find(|candidate| candidate.exists())
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with the database under `base/.quire/`.
    fn default_with_base(base: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfigRaw::default(),
            site: SiteConfig::default(),
            preview: PreviewConfig::default(),
            database_resolved: DatabaseConfig::for_file(
                base.join(PROJECT_DIR).join(DATABASE_FILENAME),
            ),
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_database()?;
        self.validate_site()?;
        self.validate_preview()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        // Port 0 lets the OS pick one, which a config file never means
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    fn validate_database(&self) -> Result<(), ConfigError> {
        let url = &self.database_resolved.url;
        require_non_empty(url, "database.url")?;
        if !url.starts_with("sqlite:") {
            return Err(ConfigError::Validation(
                "database.url must be a sqlite: URL".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_site(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.site.menu_base_url, "site.menu_base_url")?;
        require_non_empty(&self.site.static_url, "site.static_url")?;
        require_url_prefix(&self.site.console_prefix, "site.console_prefix")?;
        Ok(())
    }

    fn validate_preview(&self) -> Result<(), ConfigError> {
        let name = &self.preview.cookie_name;
        require_non_empty(name, "preview.cookie_name")?;
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ConfigError::Validation(
                "preview.cookie_name may only contain letters, digits, _ and -".to_owned(),
            ));
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        if let Some(ref url) = self.database.url {
            self.database.url = Some(expand::expand_env(url, "database.url")?);
        }

        Ok(())
    }

    /// Resolve the database location against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        self.database_resolved = match (&self.database.url, &self.database.path) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::Validation(
                    "database.url and database.path cannot both be set".to_owned(),
                ));
            }
            (Some(url), None) => DatabaseConfig::for_url(url.clone()),
            (None, Some(path)) => DatabaseConfig::for_file(config_dir.join(path)),
            (None, None) => DatabaseConfig::for_file(
                config_dir.join(PROJECT_DIR).join(DATABASE_FILENAME),
            ),
        };

        Ok(())
    }
}
