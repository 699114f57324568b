use std::path::PathBuf;
use std::process;
mod cli;
mod completions;
mod error;
mod exit_codes;
mod gate;
mod logging;
mod report;
mod status;
mod wait;

use cli::{Cli, Commands, GateArgs, OutputFormat};
use exit_codes::{EXIT_ERROR, EXIT_SUCCESS};
use workflow_gate::DebugLevel;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    let debug = logging::early_debug_level(cli.debug, cli.config.as_deref());
    logging::init(cli.quiet, debug);

    let exit_code = match cli.command {
        Some(Commands::Completion { shell }) => {
            tracing::debug!("Generating completion for {:?}", shell);
            run_completions(shell)
        }
        Some(Commands::Status { gate, format }) => {
            tracing::debug!("Running status command");
            run_status(gate, cli.debug, cli.config, format).await
        }
        Some(Commands::Wait { gate }) => {
            tracing::debug!("Running wait command");
            run_wait(gate, cli.debug, cli.config).await
        }
        None => {
            tracing::debug!("No command given, waiting with action inputs");
            run_wait(GateArgs::default(), cli.debug, cli.config).await
        }
    };

    process::exit(exit_code);
}

async fn run_wait(gate: GateArgs, debug: Option<DebugLevel>, config: Option<PathBuf>) -> i32 {
    let overrides = gate.into_overrides(debug);
    report::handle_gate_result(wait::run_wait_command(overrides, config.as_deref()).await)
}

async fn run_status(
    gate: GateArgs,
    debug: Option<DebugLevel>,
    config: Option<PathBuf>,
    format: OutputFormat,
) -> i32 {
    use error::handle_cli_result;

    let overrides = gate.into_overrides(debug);
    match status::run_status_command(overrides, config.as_deref(), format).await {
        Ok(exit_code) => exit_code,
        Err(e) => handle_cli_result::<()>(Err(e)),
    }
}

fn run_completions(shell: clap_complete::Shell) -> i32 {
    match completions::print_completion(shell) {
        Ok(_) => EXIT_SUCCESS,
        Err(e) => {
            tracing::error!("Completion error: {}", e);
            EXIT_ERROR
        }
    }
}
