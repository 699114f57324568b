//! Per-workflow resolution
//!
//! One resolution attempt queries the workflow's recent runs, matches the
//! run belonging to the trigger and classifies it. The outcome is a plain
//! value so the polling loop decides how to react.

use crate::error::Result;
use crate::github::{
    EventKind, RunConclusion, RunFilter, RunId, RunQueryClient, RunStatus, RunSummary,
};
use crate::matcher::find_candidate;
use crate::trigger::TriggerIdentity;
use serde::Serialize;
use std::fmt;

/// Why a workflow is not resolved yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "status", rename_all = "snake_case")]
pub enum PendingReason {
    /// No run of this trigger has been listed yet
    NoCandidate,
    /// The matched run has not completed
    NotCompleted(RunStatus),
    /// The API does not know the workflow (yet)
    NotFound,
}

impl fmt::Display for PendingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingReason::NoCandidate => f.write_str("no matching run yet"),
            PendingReason::NotCompleted(status) => write!(f, "run is {status}"),
            PendingReason::NotFound => f.write_str("workflow not found"),
        }
    }
}

/// Outcome of one resolution attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// Try again next round
    Pending {
        /// What is still missing
        reason: PendingReason,
    },
    /// The matched run completed successfully
    Succeeded {
        /// The matched run
        run_id: RunId,
    },
    /// The matched run completed with any other conclusion
    Failed {
        /// Workflow that failed
        workflow: String,
        /// The matched run
        run_id: RunId,
        /// Its conclusion
        conclusion: RunConclusion,
        /// Link to the run
        html_url: Option<String>,
    },
}

impl WorkflowStatus {
    /// Shorthand for a pending status
    pub fn pending(reason: PendingReason) -> Self {
        WorkflowStatus::Pending { reason }
    }

    /// Classify a matched run of `workflow`
    pub fn classify(workflow: &str, run: &RunSummary) -> Self {
        if !run.is_completed() {
            return Self::pending(PendingReason::NotCompleted(run.status));
        }

        match run.conclusion {
            Some(RunConclusion::Success) => WorkflowStatus::Succeeded { run_id: run.id },
            conclusion => WorkflowStatus::Failed {
                workflow: workflow.to_string(),
                run_id: run.id,
                conclusion: conclusion.unwrap_or(RunConclusion::Unknown),
                html_url: run.html_url.clone(),
            },
        }
    }
}

/// A resolution attempt together with the run it was based on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inspection {
    /// Workflow that was resolved
    pub workflow: String,
    /// Its status
    pub status: WorkflowStatus,
    /// The matched run, if any
    pub run: Option<RunSummary>,
}

/// Resolves workflows against one trigger identity
pub struct WorkflowResolver<'a> {
    client: &'a dyn RunQueryClient,
    trigger: &'a TriggerIdentity,
    branch: Option<String>,
    page_size: u8,
}

impl<'a> WorkflowResolver<'a> {
    /// Create a resolver querying through `client`
    pub fn new(
        client: &'a dyn RunQueryClient,
        trigger: &'a TriggerIdentity,
        branch: Option<String>,
        page_size: u8,
    ) -> Self {
        Self {
            client,
            trigger,
            branch,
            page_size,
        }
    }

    /// Resolve `workflow` once.
    ///
    /// Only errors other than "not found" are returned as `Err`.
    pub async fn resolve(&self, workflow: &str) -> Result<WorkflowStatus> {
        Ok(self.inspect(workflow).await?.status)
    }

    /// Resolve `workflow` once and keep the matched run
    pub async fn inspect(&self, workflow: &str) -> Result<Inspection> {
        let run = match self.find_run(workflow).await {
            Ok(run) => run,
            Err(e) if e.is_not_found() => {
                tracing::debug!("Workflow '{}' not found, will retry: {}", workflow, e);
                return Ok(Inspection {
                    workflow: workflow.to_string(),
                    status: WorkflowStatus::pending(PendingReason::NotFound),
                    run: None,
                });
            }
            Err(e) => return Err(e),
        };

        let status = match &run {
            Some(run) => WorkflowStatus::classify(workflow, run),
            None => WorkflowStatus::pending(PendingReason::NoCandidate),
        };
        tracing::debug!("Workflow '{}': {:?}", workflow, status);

        Ok(Inspection {
            workflow: workflow.to_string(),
            status,
            run,
        })
    }

    async fn find_run(&self, workflow: &str) -> Result<Option<RunSummary>> {
        if let Some(run) = self.query(workflow, &self.trigger.event).await? {
            return Ok(Some(run));
        }

        match self.trigger.event.fallback() {
            Some(fallback) => {
                tracing::debug!(
                    "No '{}' run for {}, retrying as {}",
                    workflow,
                    self.trigger.event,
                    fallback
                );
                self.query(workflow, &fallback).await
            }
            None => Ok(None),
        }
    }

    async fn query(&self, workflow: &str, event: &EventKind) -> Result<Option<RunSummary>> {
        let filter = RunFilter {
            workflow_id: workflow.to_string(),
            event: event.clone(),
            branch: self.branch.clone(),
            page_size: self.page_size,
        };
        let runs = self.client.list_runs(&filter).await?;
        Ok(find_candidate(&runs, self.trigger, event).cloned())
    }
}
