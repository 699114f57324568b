//! workflow-gate CLI Library
//!
//! This library exposes the pieces of the workflow-gate CLI that tests and
//! other tools build on: argument definitions, exit codes and GitHub Actions
//! workflow command formatting.

// Re-export modules for use in tests
/// Command-line interface definitions and argument parsing
pub mod cli;
/// CLI error type and exit code mapping
pub mod error;
/// Exit codes used by the CLI application
pub mod exit_codes;
/// GitHub Actions workflow command output
pub mod report;
