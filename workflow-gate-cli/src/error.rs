//! Error handling for the workflow-gate CLI
//!
//! Errors keep their source chain for display while carrying the exit code
//! the process should end with.

use crate::exit_codes::{EXIT_ERROR, EXIT_FAILURE};
use std::error::Error;
use std::fmt;
use workflow_gate::WorkflowGateError;

/// CLI-specific result type that preserves error information
pub type CliResult<T> = Result<T, CliError>;

/// CLI error type that includes both error information and suggested exit code
#[derive(Debug)]
pub struct CliError {
    pub message: String,
    pub exit_code: i32,
    pub source: Option<Box<dyn Error + Send + Sync>>,
}

impl CliError {
    /// Create a new CLI error with a message and exit code
    pub fn new(message: impl Into<String>, exit_code: i32) -> Self {
        Self {
            message: message.into(),
            exit_code,
            source: None,
        }
    }

    /// Create a CLI error from another error with a specific exit code
    pub fn from_error<E: Error + Send + Sync + 'static>(error: E, exit_code: i32) -> Self {
        let message = error.to_string();
        Self {
            message,
            exit_code,
            source: Some(Box::new(error)),
        }
    }

    /// A definitive failure of a watched workflow (exit code 1)
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, EXIT_FAILURE)
    }

    /// Configuration or unexpected error (exit code 2)
    pub fn error<E: Error + Send + Sync + 'static>(error: E) -> Self {
        Self::from_error(error, EXIT_ERROR)
    }

    /// Get the full error chain as a formatted string
    pub fn full_chain(&self) -> String {
        let mut result = self.message.clone();

        // The first source is this error's own cause, already in `message`.
        let mut current_source = self.source().and_then(|err| err.source());
        while let Some(err) = current_source {
            result.push_str(&format!("\n  Caused by: {}", err));
            current_source = err.source();
        }

        result
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}

impl From<WorkflowGateError> for CliError {
    fn from(error: WorkflowGateError) -> Self {
        Self::error(error)
    }
}

/// Extension trait for converting results to CLI results
pub trait IntoCliResult<T> {
    fn cli_error(self, exit_code: i32) -> CliResult<T>;
    fn cli_unexpected_error(self) -> CliResult<T>;
}

impl<T, E: Error + Send + Sync + 'static> IntoCliResult<T> for Result<T, E> {
    fn cli_error(self, exit_code: i32) -> CliResult<T> {
        self.map_err(|e| CliError::from_error(e, exit_code))
    }

    fn cli_unexpected_error(self) -> CliResult<T> {
        self.map_err(CliError::error)
    }
}

/// Convert a CliResult to an exit code, printing the full error chain if needed
pub fn handle_cli_result<T>(result: CliResult<T>) -> i32 {
    match result {
        Ok(_) => crate::exit_codes::EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e.full_chain());
            e.exit_code
        }
    }
}
