//! Polling loop
//!
//! Rounds run strictly in sequence. Within a round, workflows are resolved
//! in configured order and the first pending one ends the round. The budget
//! is checked only after the sleep that follows an incomplete round, so the
//! configured maximum may be overrun by up to one interval.

use crate::config::GateConfig;
use crate::error::Result;
use crate::github::RunConclusion;
use crate::resolver::{WorkflowResolver, WorkflowStatus};
use serde::Serialize;
use std::time::Duration;

/// How a polling session ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PollOutcome {
    /// Every workflow completed successfully
    Succeeded,
    /// A workflow completed with a non-success conclusion
    Failed {
        /// Workflow that failed
        workflow: String,
        /// Its conclusion
        conclusion: RunConclusion,
        /// Link to the failing run
        html_url: Option<String>,
    },
    /// The budget ran out before all workflows completed
    TimedOut {
        /// Configured budget
        max_seconds: u64,
    },
}

impl PollOutcome {
    /// Whether the session ended successfully
    pub fn is_success(&self) -> bool {
        matches!(self, PollOutcome::Succeeded)
    }

    /// Human readable failure message, `None` on success
    pub fn failure_message(&self) -> Option<String> {
        match self {
            PollOutcome::Succeeded => None,
            PollOutcome::Failed {
                workflow,
                conclusion,
                ..
            } => Some(format!(
                "Workflow '{workflow}' finished with conclusion '{conclusion}'"
            )),
            PollOutcome::TimedOut { max_seconds } => {
                Some(format!("Time exceeded the maximum {max_seconds} seconds"))
            }
        }
    }
}

/// Summary of a finished polling session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollReport {
    /// How the session ended
    pub outcome: PollOutcome,
    /// Rounds started
    pub rounds: u32,
    /// Interval sleeps taken
    pub sleeps: u32,
    /// Accumulated sleep time
    pub elapsed_seconds: u64,
    /// Workflows confirmed successful, in resolution order
    pub resolved: Vec<String>,
    /// Workflows still unresolved when the session ended
    pub unresolved: Vec<String>,
}

/// Waits until every configured workflow has succeeded
pub struct PollingLoop<'a> {
    resolver: WorkflowResolver<'a>,
    workflows: Vec<String>,
    interval: Duration,
    max_seconds: u64,
}

impl<'a> PollingLoop<'a> {
    /// Create a loop over the workflows in `config`
    pub fn new(config: &GateConfig, resolver: WorkflowResolver<'a>) -> Self {
        Self {
            resolver,
            workflows: config.workflows.clone(),
            interval: config.wait_interval(),
            max_seconds: config.wait_max_seconds,
        }
    }

    /// Poll until success, the first failure or the budget is exceeded.
    ///
    /// Query errors other than "not found" abort the session as `Err`.
    pub async fn run(self) -> Result<PollReport> {
        let mut session = Session::new(self.workflows.clone());

        loop {
            session.rounds += 1;
            tracing::debug!(
                "Round {}: {} workflow(s) unresolved",
                session.rounds,
                session.unresolved.len()
            );

            let mut succeeded = 0;
            let mut failure = None;
            for workflow in &session.unresolved {
                match self.resolver.resolve(workflow).await? {
                    WorkflowStatus::Succeeded { run_id } => {
                        tracing::info!("Workflow '{}' succeeded (run {})", workflow, run_id);
                        succeeded += 1;
                    }
                    WorkflowStatus::Failed {
                        workflow,
                        run_id,
                        conclusion,
                        html_url,
                    } => {
                        tracing::error!(
                            "Workflow '{}' run {} finished with conclusion '{}'",
                            workflow,
                            run_id,
                            conclusion
                        );
                        failure = Some(PollOutcome::Failed {
                            workflow,
                            conclusion,
                            html_url,
                        });
                        break;
                    }
                    WorkflowStatus::Pending { reason } => {
                        tracing::info!("Waiting for workflow '{}': {}", workflow, reason);
                        break;
                    }
                }
            }
            // Successes form a prefix of the round since anything else ends it.
            session.mark_resolved(succeeded);

            if let Some(outcome) = failure {
                return Ok(session.finish(outcome));
            }
            if session.unresolved.is_empty() {
                tracing::info!("All workflows succeeded after {} round(s)", session.rounds);
                return Ok(session.finish(PollOutcome::Succeeded));
            }

            tokio::time::sleep(self.interval).await;
            session.sleeps += 1;
            session.elapsed_seconds += self.interval.as_secs();

            if session.elapsed_seconds > self.max_seconds {
                tracing::warn!(
                    "Gave up after {}s with {} workflow(s) unresolved",
                    session.elapsed_seconds,
                    session.unresolved.len()
                );
                return Ok(session.finish(PollOutcome::TimedOut {
                    max_seconds: self.max_seconds,
                }));
            }
        }
    }
}

/// Mutable state of one polling session
struct Session {
    unresolved: Vec<String>,
    resolved: Vec<String>,
    rounds: u32,
    sleeps: u32,
    elapsed_seconds: u64,
}

impl Session {
    fn new(workflows: Vec<String>) -> Self {
        Self {
            unresolved: workflows,
            resolved: Vec::new(),
            rounds: 0,
            sleeps: 0,
            elapsed_seconds: 0,
        }
    }

    fn mark_resolved(&mut self, count: usize) {
        self.resolved.extend(self.unresolved.drain(..count));
    }

    fn finish(self, outcome: PollOutcome) -> PollReport {
        PollReport {
            outcome,
            rounds: self.rounds,
            sleeps: self.sleeps,
            elapsed_seconds: self.elapsed_seconds,
            resolved: self.resolved,
            unresolved: self.unresolved,
        }
    }
}
