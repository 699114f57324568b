//! GitHub Actions workflow commands
//!
//! The runner scans stdout for `::command::message` lines. Messages must be
//! escaped so that a multi-line error stays a single annotation.

use crate::error::CliResult;
use crate::exit_codes::EXIT_SUCCESS;
use std::io::{self, Write};

/// Escape a workflow command message the way the Actions toolkit does
pub fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Format an `::error::` workflow command
pub fn error_command(message: &str) -> String {
    format!("::error::{}", escape_data(message))
}

/// Write an `::error::` annotation to `out`
pub fn write_error<W: Write>(out: &mut W, message: &str) -> io::Result<()> {
    writeln!(out, "{}", error_command(message))
}

/// Turn the result of a gate run into an exit code, annotating failures
pub fn handle_gate_result(result: CliResult<()>) -> i32 {
    match result {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let message = e.full_chain();
            if let Err(write_err) = write_error(&mut io::stdout(), &message) {
                tracing::warn!("Failed to write error annotation: {}", write_err);
            }
            eprintln!("Error: {}", message);
            e.exit_code
        }
    }
}
