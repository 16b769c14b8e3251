//! Environment and home-directory expansion for configuration strings.
//!
//! - `${VAR}` expands to the value of VAR and fails if it is unset
//! - `${VAR:-default}` falls back to `default`
//! - a leading `~` in paths expands to the user's home directory

use std::path::PathBuf;

use crate::ConfigError;

/// Expand `${VAR}` references in a configuration value.
///
/// Bare `$VAR` is left alone so URLs and passwords containing `$` survive.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var).map(Some).map_err(|_| UnsetVar {
            name: var.to_owned(),
        })
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.name),
    })
}

/// Expand an optional value, mapping results that expand to nothing to `None`.
///
/// Lets `username = "${CONFLUENCE_USER:-}"` behave as "not configured".
pub(crate) fn expand_optional(
    value: Option<&str>,
    field: &str,
) -> Result<Option<String>, ConfigError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let expanded = expand_env(value, field)?;
    Ok((!expanded.is_empty()).then_some(expanded))
}

/// Expand `~` and `${VAR}` in a filesystem path.
pub(crate) fn expand_path(value: &str, field: &str) -> Result<PathBuf, ConfigError> {
    let expanded = expand_env(value, field)?;
    Ok(PathBuf::from(shellexpand::tilde(&expanded).into_owned()))
}

struct UnsetVar {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_simple_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("CONFPUB_TEST_SIMPLE", "hello");
        }
        let result = expand_env("${CONFPUB_TEST_SIMPLE}", "test.field").unwrap();
        assert_eq!(result, "hello");
        unsafe {
            std::env::remove_var("CONFPUB_TEST_SIMPLE");
        }
    }

    #[test]
    fn test_expand_with_default_uses_default() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("CONFPUB_TEST_UNSET");
        }
        let result = expand_env("${CONFPUB_TEST_UNSET:-fallback}", "test.field").unwrap();
        assert_eq!(result, "fallback");
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("CONFPUB_TEST_MISSING");
        }
        let err = expand_env("${CONFPUB_TEST_MISSING}", "confluence.password").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("CONFPUB_TEST_MISSING"));
        assert!(err.to_string().contains("confluence.password"));
    }

    #[test]
    fn test_expand_embedded_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("CONFPUB_TEST_HOST", "wiki.example.com");
        }
        let result = expand_env("https://${CONFPUB_TEST_HOST}/confluence", "url").unwrap();
        assert_eq!(result, "https://wiki.example.com/confluence");
        unsafe {
            std::env::remove_var("CONFPUB_TEST_HOST");
        }
    }

    #[test]
    fn test_bare_dollar_not_expanded() {
        let result = expand_env("pa$$word", "confluence.password").unwrap();
        assert_eq!(result, "pa$$word");
    }

    #[test]
    fn test_expand_optional_empty_is_none() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("CONFPUB_TEST_EMPTY_USER");
        }
        let result = expand_optional(Some("${CONFPUB_TEST_EMPTY_USER:-}"), "user").unwrap();
        assert_eq!(result, None);
        assert_eq!(expand_optional(None, "user").unwrap(), None);
        assert_eq!(
            expand_optional(Some("admin"), "user").unwrap(),
            Some("admin".to_owned())
        );
    }

    #[test]
    fn test_expand_path_plain() {
        let path = expand_path("/etc/confpub/settings.toml", "settings_file").unwrap();
        assert_eq!(path, PathBuf::from("/etc/confpub/settings.toml"));
    }

    #[test]
    fn test_expand_path_tilde() {
        let path = expand_path("~/.confpub/settings.toml", "settings_file").unwrap();
        assert!(!path.starts_with("~") || std::env::var_os("HOME").is_none());
        assert!(path.ends_with(".confpub/settings.toml"));
    }
}
