use colored::*;
use serde::Serialize;
use std::path::Path;
use tabled::{
    settings::{object::Rows, Alignment, Color, Modify, Style},
    Table, Tabled,
};

use crate::cli::{Cli, OutputFormat};
use crate::error::{CliResult, IntoCliResult};
use crate::exit_codes::{EXIT_FAILURE, EXIT_SUCCESS};
use crate::gate::Gate;
use workflow_gate::{ConfigOverrides, Inspection, TriggerIdentity, WorkflowStatus};

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Workflow")]
    workflow: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Run")]
    run: String,
    #[tabled(rename = "Conclusion")]
    conclusion: String,
    #[tabled(rename = "URL")]
    url: String,
}

#[derive(Serialize)]
struct StatusDocument<'a> {
    trigger: &'a TriggerIdentity,
    workflows: &'a [Inspection],
}

/// Resolve every workflow once and print the result.
///
/// Unlike `wait`, a failed workflow does not stop the remaining lookups.
/// Returns exit code 1 when any workflow failed.
pub async fn run_status_command(
    cli: ConfigOverrides,
    config_file: Option<&Path>,
    format: OutputFormat,
) -> CliResult<i32> {
    let gate = Gate::load(cli, config_file)?;
    let trigger = gate.trigger().await?;
    let resolver = gate.resolver(&trigger);

    let mut inspections = Vec::with_capacity(gate.config.workflows.len());
    for workflow in &gate.config.workflows {
        inspections.push(resolver.inspect(workflow).await?);
    }

    match format {
        OutputFormat::Table => {
            println!("{}", render_table(&inspections, Cli::should_use_color()));
            println!("{}", summary_line(&inspections, Cli::should_use_color()));
        }
        OutputFormat::Json => {
            let document = StatusDocument {
                trigger: &trigger,
                workflows: &inspections,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&document).cli_unexpected_error()?
            );
        }
    }

    Ok(exit_code(&inspections))
}

fn exit_code(inspections: &[Inspection]) -> i32 {
    let any_failed = inspections
        .iter()
        .any(|i| matches!(i.status, WorkflowStatus::Failed { .. }));
    if any_failed {
        EXIT_FAILURE
    } else {
        EXIT_SUCCESS
    }
}

fn state_label(status: &WorkflowStatus) -> String {
    match status {
        WorkflowStatus::Pending { reason } => format!("pending ({reason})"),
        WorkflowStatus::Succeeded { .. } => "succeeded".to_string(),
        WorkflowStatus::Failed { .. } => "failed".to_string(),
    }
}

fn render_table(inspections: &[Inspection], color: bool) -> String {
    let rows: Vec<StatusRow> = inspections
        .iter()
        .map(|inspection| {
            let run = inspection.run.as_ref();
            StatusRow {
                workflow: inspection.workflow.clone(),
                state: state_label(&inspection.status),
                run: run.map(|r| r.id.to_string()).unwrap_or_default(),
                conclusion: run
                    .and_then(|r| r.conclusion)
                    .map(|c| c.to_string())
                    .unwrap_or_default(),
                url: run.and_then(|r| r.html_url.clone()).unwrap_or_default(),
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::modern());

    if color {
        table.with(Modify::new(Rows::one(0)).with(Color::FG_BRIGHT_CYAN));

        for (i, inspection) in inspections.iter().enumerate() {
            let row_index = i + 1; // +1 because row 0 is header
            let row_color = match inspection.status {
                WorkflowStatus::Succeeded { .. } => Color::FG_GREEN,
                WorkflowStatus::Failed { .. } => Color::FG_RED,
                WorkflowStatus::Pending { .. } => Color::FG_YELLOW,
            };
            table.with(Modify::new(Rows::one(row_index)).with(row_color));
        }
    }

    table.with(Modify::new(Rows::new(1..)).with(Alignment::left()));
    table.to_string()
}

fn summary_line(inspections: &[Inspection], color: bool) -> String {
    let mut succeeded = 0;
    let mut failed = 0;
    let mut pending = 0;
    for inspection in inspections {
        match inspection.status {
            WorkflowStatus::Succeeded { .. } => succeeded += 1,
            WorkflowStatus::Failed { .. } => failed += 1,
            WorkflowStatus::Pending { .. } => pending += 1,
        }
    }

    let succeeded = format!("{succeeded} succeeded");
    let failed = format!("{failed} failed");
    let pending = format!("{pending} pending");
    if color {
        format!("{}, {}, {}", succeeded.green(), failed.red(), pending.yellow())
    } else {
        format!("{succeeded}, {failed}, {pending}")
    }
}
