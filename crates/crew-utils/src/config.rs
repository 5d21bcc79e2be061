//! Configuration helpers
//!
//! Settings come from the process environment, optionally seeded from a
//! `.env` file. Readers take an [`EnvLookup`] so tests can supply variables
//! without touching the real environment.

use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Source of environment-style variables
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Errors raised while reading configuration
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is present but does not parse
    #[error("{key} has invalid value '{value}': {reason}")]
    Invalid {
        /// Variable name
        key: String,
        /// Raw value
        value: String,
        /// Parser message
        reason: String,
    },
}

/// Load `.env` from the current directory or its parents
///
/// Returns the path that was loaded. Variables already set in the process
/// environment are not overridden.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "Loaded .env file");
            Some(path)
        }
        Err(e) if e.not_found() => None,
        Err(e) => {
            tracing::warn!("Failed to load .env file: {e}");
            None
        }
    }
}

/// Lookup backed by the process environment
pub fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Read a variable, trimmed; blank values count as unset
pub fn read_var(lookup: EnvLookup<'_>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read and parse a variable; unset gives `Ok(None)`
pub fn parse_var<T>(lookup: EnvLookup<'_>, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    read_var(lookup, key)
        .map(|value| {
            value.parse::<T>().map_err(|e| ConfigError::Invalid {
                key: key.to_string(),
                reason: e.to_string(),
                value,
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(key: &str) -> Option<String> {
        match key {
            "NAME" => Some("  llama  ".to_string()),
            "BLANK" => Some("   ".to_string()),
            "COUNT" => Some("7".to_string()),
            "BAD" => Some("seven".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_read_var_trims_and_skips_blank() {
        assert_eq!(read_var(&vars, "NAME").as_deref(), Some("llama"));
        assert_eq!(read_var(&vars, "BLANK"), None);
        assert_eq!(read_var(&vars, "MISSING"), None);
    }

    #[test]
    fn test_parse_var() {
        assert_eq!(parse_var::<u32>(&vars, "COUNT"), Ok(Some(7)));
        assert_eq!(parse_var::<u32>(&vars, "MISSING"), Ok(None));

        let err = parse_var::<u32>(&vars, "BAD").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "BAD"));
        assert!(err.to_string().starts_with("BAD has invalid value 'seven'"));
    }
}
