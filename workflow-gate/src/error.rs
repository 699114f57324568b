//! Unified error handling for the workflow gate library
//!
//! Query failures are split into two classes: a `NotFound` response from the
//! API means "not there yet" and is retried by the polling loop, every other
//! failure propagates to the caller.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the workflow gate library
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WorkflowGateError {
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level HTTP failure
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    /// The API answered 404 for the requested resource
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Description of the resource that was requested
        resource: String,
    },

    /// The API answered with a non-success status other than 404
    #[error("GitHub API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body, truncated
        message: String,
    },

    /// Invalid or missing configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic error with context
    #[error("{message}")]
    Context {
        /// Message describing what was being attempted
        message: String,
        /// Underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl WorkflowGateError {
    /// Whether this error means the queried resource does not exist yet.
    ///
    /// The resolver treats these as "try again next round".
    pub fn is_not_found(&self) -> bool {
        matches!(self, WorkflowGateError::NotFound { .. })
    }
}

/// Configuration errors
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// Missing configuration
    #[error("Missing configuration: {name}")]
    Missing {
        /// Name of the missing setting
        name: String,
    },

    /// Invalid configuration
    #[error("Invalid configuration '{name}': {reason}")]
    Invalid {
        /// Name of the offending setting
        name: String,
        /// Why the value was rejected
        reason: String,
    },

    /// Environment variable error
    #[error("Environment variable '{var}' error: {reason}")]
    EnvVar {
        /// Variable name
        var: String,
        /// What was wrong with it
        reason: String,
    },

    /// Failed to read a configuration file from disk
    #[error("Failed to read configuration file {path}: {source}")]
    FileRead {
        /// Path to the configuration file that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Failed to parse YAML content from a configuration file
    #[error("Invalid YAML syntax in {path}:\n{source}\n\nHint: Check for proper indentation and YAML formatting")]
    YamlParse {
        /// Path to the configuration file with invalid YAML content
        path: PathBuf,
        /// Underlying YAML parsing error
        #[source]
        source: serde_yaml::Error,
    },
}

/// Result type alias for workflow gate operations
pub type Result<T> = std::result::Result<T, WorkflowGateError>;

/// Extension trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add context with a closure that's only called on error
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| WorkflowGateError::Context {
            message: f().into(),
            source: Box::new(e),
        })
    }
}
