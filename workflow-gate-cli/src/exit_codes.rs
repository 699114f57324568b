//! Exit code constants for CLI commands
//!
//! These constants define the standard exit codes used throughout the application:
//! - 0: Every workflow succeeded
//! - 1: A workflow failed or the waiting budget ran out
//! - 2: Configuration or unexpected errors

/// Successful execution
pub const EXIT_SUCCESS: i32 = 0;

/// A workflow failed or the budget was exceeded
pub const EXIT_FAILURE: i32 = 1;

/// Configuration, API or other unexpected errors
pub const EXIT_ERROR: i32 = 2;
