//! # Workflow Gate
//!
//! Blocks a GitHub Actions job until sibling workflows started by the same
//! push or pull request have completed successfully.
//!
//! ## Features
//!
//! - **Trigger Identity**: Recognise the runs started by the same event as the caller
//! - **Candidate Matching**: Pick that run out of a workflow's recent runs
//! - **Polling**: Re-check unresolved workflows until success, failure or timeout
//! - **Pluggable API**: Query through any [`RunQueryClient`]; [`GitHubClient`] talks REST
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use workflow_gate::{
//!     ActionContext, ConfigOverrides, GateConfig, GitHubClient, PollingLoop, TriggerIdentity,
//!     WorkflowResolver,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GateConfig::load(ConfigOverrides::default(), None)?;
//! let context = ActionContext::from_env()?;
//! let client = GitHubClient::new(
//!     &config.api_url,
//!     &config.repo_token,
//!     context.repository.clone(),
//!     config.request_timeout(),
//! )?;
//!
//! let trigger = TriggerIdentity::resolve(&context, &client).await?;
//! let resolver = WorkflowResolver::new(&client, &trigger, context.branch(), config.page_size);
//! let report = PollingLoop::new(&config, resolver).run().await?;
//!
//! if let Some(message) = report.outcome.failure_message() {
//!     eprintln!("{}", message);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

/// Shared helpers
pub mod common;

/// Layered configuration
pub mod config;

/// GitHub Actions run context
pub mod context;

/// Error types used throughout the library
pub mod error;

/// GitHub Actions REST API access
pub mod github;

/// Candidate matching
pub mod matcher;

/// Polling loop
pub mod poller;

/// Per-workflow resolution
pub mod resolver;

/// Trigger identity
pub mod trigger;

/// Test utilities for mocking the run query client
#[doc(hidden)]
pub mod test_utils;

pub use config::{ConfigOverrides, DebugLevel, GateConfig, YamlConfig};
pub use context::ActionContext;
pub use error::{ConfigError, ErrorContext, Result, WorkflowGateError};
pub use github::{EventKind, GitHubClient, RunConclusion, RunId, RunQueryClient, RunSummary};
pub use matcher::{find_candidate, TimestampRule};
pub use poller::{PollOutcome, PollReport, PollingLoop};
pub use resolver::{Inspection, PendingReason, WorkflowResolver, WorkflowStatus};
pub use trigger::TriggerIdentity;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ActionContext, ConfigOverrides, EventKind, GateConfig, GitHubClient, PollOutcome,
        PollReport, PollingLoop, Result, RunQueryClient, TriggerIdentity, WorkflowGateError,
        WorkflowResolver, WorkflowStatus,
    };
}
