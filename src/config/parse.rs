//! Environment variable parsing utilities.

use std::str::FromStr;

use super::ConfigError;

/// Get environment variable with default value.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get optional environment variable (None if empty or missing).
pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

/// Parse optional environment variable with type conversion.
pub fn env_parse_opt<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env_opt(key) {
        Some(v) => v.parse().map(Some).map_err(|e: T::Err| ConfigError::Parse {
            key: key.into(),
            value: v,
            error: e.to_string(),
        }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogFormat;

    #[test]
    fn test_env_opt_filters_empty() {
        std::env::set_var("CONTAINER_PROBE_TEST_EMPTY", "");
        assert_eq!(env_opt("CONTAINER_PROBE_TEST_EMPTY"), None);
        std::env::remove_var("CONTAINER_PROBE_TEST_EMPTY");

        assert_eq!(
            env_or("CONTAINER_PROBE_TEST_MISSING", "fallback"),
            "fallback"
        );
    }

    #[test]
    fn test_env_parse_opt() {
        std::env::set_var("CONTAINER_PROBE_TEST_FORMAT", "text");
        assert_eq!(
            env_parse_opt::<LogFormat>("CONTAINER_PROBE_TEST_FORMAT").unwrap(),
            Some(LogFormat::Text)
        );

        std::env::set_var("CONTAINER_PROBE_TEST_FORMAT", "yaml");
        let err = env_parse_opt::<LogFormat>("CONTAINER_PROBE_TEST_FORMAT").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        std::env::remove_var("CONTAINER_PROBE_TEST_FORMAT");
        assert_eq!(
            env_parse_opt::<LogFormat>("CONTAINER_PROBE_TEST_FORMAT").unwrap(),
            None
        );
    }
}
