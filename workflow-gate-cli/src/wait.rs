use crate::error::{CliError, CliResult};
use crate::gate::Gate;
use std::path::Path;
use workflow_gate::{ConfigOverrides, PollOutcome, PollingLoop};

/// Wait until every configured workflow succeeded.
///
/// A failed workflow or an exhausted budget is an error with exit code 1.
pub async fn run_wait_command(cli: ConfigOverrides, config_file: Option<&Path>) -> CliResult<()> {
    let gate = Gate::load(cli, config_file)?;
    let trigger = gate.trigger().await?;

    tracing::info!(
        "Waiting for {} workflow(s), checking every {}s for up to {}s",
        gate.config.workflows.len(),
        gate.config.wait_interval_seconds,
        gate.config.wait_max_seconds
    );
    let report = PollingLoop::new(&gate.config, gate.resolver(&trigger))
        .run()
        .await?;
    tracing::debug!(
        "Finished after {} round(s), {} sleep(s), {}s",
        report.rounds,
        report.sleeps,
        report.elapsed_seconds
    );

    if let PollOutcome::Failed {
        html_url: Some(url),
        ..
    } = &report.outcome
    {
        tracing::error!("Failed run: {}", url);
    }

    match report.outcome.failure_message() {
        None => Ok(()),
        Some(message) => Err(CliError::failure(message)),
    }
}
