//! Error type for content operations.

use quire_store::{StoreError, StoreErrorKind};

/// Error returned by [`Site`](crate::Site) operations.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// Input rejected by a hierarchy or uniqueness rule.
    ///
    /// `field` is `None` for errors not tied to a single form field.
    #[error("{message}")]
    Validation {
        field: Option<&'static str>,
        message: String,
    },
    /// Requested menu, section, block or blurb does not exist.
    #[error("Not found: {what}")]
    NotFound { what: String },
    /// Block type key missing from the registry.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// Backend failure.
    #[error(transparent)]
    Store(StoreError),
}

impl ContentError {
    pub(crate) fn validation(field: Option<&'static str>, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }
}

impl From<StoreError> for ContentError {
    fn from(e: StoreError) -> Self {
        match e.kind() {
            StoreErrorKind::NotFound => Self::NotFound {
                what: e.entity().unwrap_or("row").to_owned(),
            },
            _ => Self::Store(e),
        }
    }
}
