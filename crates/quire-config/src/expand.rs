//! `${VAR}` and `${VAR:-default}` expansion for configuration strings.

use crate::ConfigError;

/// Expand environment variable references in `value`.
///
/// Only the braced form is expanded; a bare `$VAR` is kept as written.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var)
            .map(Some)
            .map_err(|_| UnsetVar(var.to_owned()))
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

struct UnsetVar(String);

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_expand_set_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("QUIRE_EXPAND_HOST", "db.internal");
        }
        let result = expand_env("postgres://${QUIRE_EXPAND_HOST}/quire", "database.url").unwrap();
        assert_eq!(result, "postgres://db.internal/quire");
        unsafe {
            std::env::remove_var("QUIRE_EXPAND_HOST");
        }
    }

    #[test]
    fn test_expand_falls_back_to_default() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("QUIRE_EXPAND_UNSET");
        }
        let result = expand_env("${QUIRE_EXPAND_UNSET:-0.0.0.0}", "server.host").unwrap();
        assert_eq!(result, "0.0.0.0");
    }

    #[test]
    fn test_expand_unset_var_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("QUIRE_EXPAND_MISSING");
        }
        let err = expand_env("${QUIRE_EXPAND_MISSING}", "server.host").unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert_eq!(
            err.to_string(),
            "Environment variable error in server.host: ${QUIRE_EXPAND_MISSING} not set"
        );
    }

    #[test]
    fn test_bare_dollar_kept() {
        assert_eq!(
            expand_env("sqlite://$HOME/content.db", "database.url").unwrap(),
            "sqlite://$HOME/content.db"
        );
    }
}
