use clap::{Args, Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::io;
use std::path::PathBuf;
use workflow_gate::config::parse_workflow_list;
use workflow_gate::{ConfigOverrides, DebugLevel};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "workflow-gate")]
#[command(version)]
#[command(about = "Wait for sibling GitHub Actions workflows to succeed")]
#[command(long_about = "
workflow-gate blocks a GitHub Actions job until the other workflows started
by the same push or pull request have completed successfully. It fails as
soon as one of them fails, or once the waiting budget is exhausted.

Settings come from action inputs (INPUT_* variables), an optional
workflow-gate.yaml file and the flags below, flags taking precedence.

Example usage:
  workflow-gate wait -w build.yml -w test.yml   # Wait for two workflows
  workflow-gate status --format json            # One-off status check
  workflow-gate completion bash > ~/.bashrc.d/workflow-gate

Running without a subcommand behaves like `wait`.
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Debug output: off, on or verbose
    #[arg(long, global = true, value_name = "LEVEL")]
    pub debug: Option<DebugLevel>,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a YAML configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Wait until every workflow has succeeded
    #[command(long_about = "
Polls each workflow in order until the run started by the same trigger as
this job has completed. Exits 0 once all succeeded, 1 when one failed or the
budget ran out, and 2 on configuration or API errors.

Example:
  workflow-gate wait --wait-interval 10 --wait-max 900 -w build.yml
")]
    Wait {
        #[command(flatten)]
        gate: GateArgs,
    },
    /// Show the current state of every workflow without waiting
    Status {
        #[command(flatten)]
        gate: GateArgs,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Generate shell completion scripts
    #[command(long_about = "
Generates shell completion scripts for various shells.

Examples:
  workflow-gate completion bash > ~/.bashrc.d/workflow-gate
  workflow-gate completion zsh > ~/.zfunc/_workflow-gate
  workflow-gate completion fish > ~/.config/fish/completions/workflow-gate.fish
")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Settings shared by `wait` and `status`
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct GateArgs {
    /// Seconds to sleep between polling rounds
    #[arg(long, value_name = "SECONDS")]
    pub wait_interval: Option<u64>,

    /// Total seconds to wait before giving up
    #[arg(long, value_name = "SECONDS")]
    pub wait_max: Option<u64>,

    /// Token used to query the GitHub API
    #[arg(long, value_name = "TOKEN")]
    pub repo_token: Option<String>,

    /// Workflow file name or id to wait for (repeatable, newline separated)
    #[arg(short, long = "workflow", value_name = "WORKFLOW")]
    pub workflows: Vec<String>,

    /// Runs fetched per query
    #[arg(long, value_name = "N")]
    pub page_size: Option<u8>,

    /// GitHub API base URL
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub request_timeout: Option<u64>,
}

impl GateArgs {
    /// The highest precedence configuration layer
    pub fn into_overrides(self, debug: Option<DebugLevel>) -> ConfigOverrides {
        let workflows: Vec<String> = self
            .workflows
            .iter()
            .flat_map(|raw| parse_workflow_list(raw))
            .collect();

        ConfigOverrides {
            wait_interval_seconds: self.wait_interval,
            wait_max_seconds: self.wait_max,
            repo_token: self.repo_token,
            workflows: (!workflows.is_empty()).then_some(workflows),
            debug,
            page_size: self.page_size,
            api_url: self.api_url,
            request_timeout_seconds: self.request_timeout,
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    #[allow(dead_code)]
    pub fn try_parse_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(args)
    }

    pub fn is_tty() -> bool {
        io::stdout().is_terminal()
    }

    pub fn should_use_color() -> bool {
        Self::is_tty() && std::env::var("NO_COLOR").is_err()
    }
}
