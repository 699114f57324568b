//! Environment variable loading utilities
//!
//! GitHub Actions hands action inputs to the process as `INPUT_<NAME>`
//! variables and the run context as `GITHUB_<NAME>` variables. An input that
//! was declared but not supplied arrives as an empty string, so empty values
//! are treated as unset throughout.

use crate::error::ConfigError;
use std::env;
use std::str::FromStr;

/// Load an environment variable, treating empty values as unset
pub fn load_env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Load and parse an optional environment variable, failing on unparsable values
pub fn try_load_env_parsed<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match load_env_string(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::EnvVar {
                var: key.to_string(),
                reason: format!("cannot parse '{}': {}", raw.trim(), e),
            }),
        None => Ok(None),
    }
}

/// Builder for loading multiple environment variables with consistent prefix
#[derive(Debug)]
pub struct EnvLoader {
    prefix: String,
}

impl EnvLoader {
    /// Create a new environment loader with the given prefix
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }

    /// Full variable name for `suffix`
    pub fn key(&self, suffix: &str) -> String {
        format!("{}_{}", self.prefix, suffix)
    }

    /// Load a string value, `None` when unset or empty
    pub fn load_string(&self, suffix: &str) -> Option<String> {
        load_env_string(&self.key(suffix))
    }

    /// Load a string value that must be present
    pub fn load_required(&self, suffix: &str) -> Result<String, ConfigError> {
        let key = self.key(suffix);
        load_env_string(&key).ok_or_else(|| ConfigError::EnvVar {
            var: key,
            reason: "not set".to_string(),
        })
    }

    /// Load an optional parsed value, reporting values that do not parse
    pub fn try_load_parsed<T>(&self, suffix: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        try_load_env_parsed(&self.key(suffix))
    }
}
