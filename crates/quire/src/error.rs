//! CLI error types.

use quire_config::ConfigError;
use quire_content::ContentError;
use quire_store::StoreError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Content(#[from] ContentError),

    #[error("{0}")]
    Server(String),
}
