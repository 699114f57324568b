//! Run records returned by the GitHub Actions API

use super::EventKind;
use crate::error::ConfigError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a workflow run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Run has been requested
    Requested,
    /// Run is waiting for a runner
    Queued,
    /// Run is executing
    InProgress,
    /// Run is waiting on an environment protection rule
    Waiting,
    /// Run is pending on a concurrency group
    Pending,
    /// Run finished; see the conclusion
    Completed,
    /// A status this client does not know about
    #[default]
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// The status as GitHub spells it
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Requested => "requested",
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::Waiting => "waiting",
            RunStatus::Pending => "pending",
            RunStatus::Completed => "completed",
            RunStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal outcome of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunConclusion {
    /// All jobs passed
    Success,
    /// At least one job failed
    Failure,
    /// Completed without a pass/fail verdict
    Neutral,
    /// Cancelled before finishing
    Cancelled,
    /// Skipped
    Skipped,
    /// Exceeded its timeout
    TimedOut,
    /// Needs manual action
    ActionRequired,
    /// Marked stale
    Stale,
    /// Failed to start
    StartupFailure,
    /// A conclusion this client does not know about
    #[serde(other)]
    Unknown,
}

impl RunConclusion {
    /// The conclusion as GitHub spells it
    pub fn as_str(&self) -> &'static str {
        match self {
            RunConclusion::Success => "success",
            RunConclusion::Failure => "failure",
            RunConclusion::Neutral => "neutral",
            RunConclusion::Cancelled => "cancelled",
            RunConclusion::Skipped => "skipped",
            RunConclusion::TimedOut => "timed_out",
            RunConclusion::ActionRequired => "action_required",
            RunConclusion::Stale => "stale",
            RunConclusion::StartupFailure => "startup_failure",
            RunConclusion::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RunConclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One workflow run as listed by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Run identifier
    pub id: RunId,
    /// Workflow display name
    #[serde(default)]
    pub name: Option<String>,
    /// Commit the run was started for
    pub head_sha: String,
    /// Branch the run was started for
    #[serde(default)]
    pub head_branch: Option<String>,
    /// Event that started the run
    pub event: EventKind,
    /// Lifecycle status; GitHub sends `null` for very fresh runs
    #[serde(default, deserialize_with = "status_or_unknown")]
    pub status: RunStatus,
    /// Outcome, only meaningful once `status` is `completed`
    #[serde(default)]
    pub conclusion: Option<RunConclusion>,
    /// When the run was created
    pub created_at: DateTime<Utc>,
    /// Link to the run in the web UI
    #[serde(default)]
    pub html_url: Option<String>,
}

impl RunSummary {
    /// Whether the run has finished
    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }
}

fn status_or_unknown<'de, D>(deserializer: D) -> std::result::Result<RunStatus, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<RunStatus>::deserialize(deserializer)?.unwrap_or_default())
}

/// Page of runs returned by the list endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRunsPage {
    /// Total runs matching the filter, across all pages
    #[serde(default)]
    pub total_count: u64,
    /// Runs on this page, most recent first
    pub workflow_runs: Vec<RunSummary>,
}

/// The calling run, as far as the gate needs it
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OwnRun {
    /// Run identifier
    pub id: RunId,
    /// When the run was created
    pub created_at: DateTime<Utc>,
}

/// `owner/name` pair identifying a repository
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    /// Account or organization that owns the repository
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepoRef {
    /// Parse the `owner/name` form used by `GITHUB_REPOSITORY`
    pub fn parse(slug: &str) -> std::result::Result<Self, ConfigError> {
        match slug.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(ConfigError::Invalid {
                name: "repository".to_string(),
                reason: format!("expected 'owner/name', got '{slug}'"),
            }),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Criteria for listing runs of one workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFilter {
    /// Workflow file name or numeric id
    pub workflow_id: String,
    /// Only runs started by this event
    pub event: EventKind,
    /// Only runs on this branch, when known
    pub branch: Option<String>,
    /// Number of runs to fetch
    pub page_size: u8,
}
