//! GitHub Actions run context
//!
//! The runner describes the calling run through `GITHUB_*` environment
//! variables plus a JSON event payload on disk. [`ActionContext`] captures
//! both once at startup.

use crate::common::env_loader::EnvLoader;
use crate::error::{ConfigError, ErrorContext, Result};
use crate::github::{EventKind, RepoRef, RunId};
use serde_json::Value;
use std::path::Path;

const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// Ambient context of the calling workflow run
#[derive(Debug, Clone, PartialEq)]
pub struct ActionContext {
    /// Repository the run belongs to
    pub repository: RepoRef,
    /// Event that triggered the run
    pub event: EventKind,
    /// Fully qualified ref, e.g. `refs/heads/main` or `refs/pull/7/merge`
    pub git_ref: String,
    /// Pull request head branch, only set for pull request events
    pub head_ref: Option<String>,
    /// Commit that triggered the run
    pub sha: String,
    /// Id of the calling run
    pub run_id: RunId,
    /// Parsed event payload, `Value::Null` when none was provided
    pub payload: Value,
}

impl ActionContext {
    /// Capture the context from the `GITHUB_*` environment
    pub fn from_env() -> Result<Self> {
        let github = EnvLoader::new("GITHUB");

        let repository = RepoRef::parse(&github.load_required("REPOSITORY")?)?;
        let run_id = github
            .try_load_parsed::<u64>("RUN_ID")?
            .map(RunId)
            .ok_or_else(|| ConfigError::EnvVar {
                var: github.key("RUN_ID"),
                reason: "not set".to_string(),
            })?;
        let payload = match github.load_string("EVENT_PATH") {
            Some(path) => Self::read_payload(Path::new(&path))?,
            None => Value::Null,
        };

        let context = Self {
            repository,
            event: EventKind::from(github.load_required("EVENT_NAME")?),
            git_ref: github.load_string("REF").unwrap_or_default(),
            head_ref: github.load_string("HEAD_REF"),
            sha: github.load_required("SHA")?,
            run_id,
            payload,
        };
        tracing::debug!(
            "Running in {} for {} event on {} (run {})",
            context.repository,
            context.event,
            context.git_ref,
            context.run_id
        );
        Ok(context)
    }

    /// Read the JSON event payload the runner wrote to disk
    pub fn read_payload(path: &Path) -> Result<Value> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read event payload {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse event payload {}", path.display()))
    }

    /// The commit sibling runs are expected to report as their head.
    ///
    /// Pull request runs report the pull request's head commit rather than
    /// the merge commit in `GITHUB_SHA`.
    pub fn head_sha(&self) -> Result<String> {
        if !self.event.is_pull_request_family() {
            return Ok(self.sha.clone());
        }

        self.payload
            .pointer("/pull_request/head/sha")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                ConfigError::Missing {
                    name: "pull_request.head.sha in event payload".to_string(),
                }
                .into()
            })
    }

    /// Branch used to filter run listings, `None` when the ref is not a branch
    pub fn branch(&self) -> Option<String> {
        // Sibling PR runs report the PR head branch, never `refs/pull/N/merge`,
        // so the filter comes from the payload rather than GITHUB_REF.
        if self.event.is_pull_request_family() {
            return self
                .payload
                .pointer("/pull_request/head/ref")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| self.head_ref.clone());
        }

        self.git_ref
            .strip_prefix(BRANCH_REF_PREFIX)
            .filter(|branch| !branch.is_empty())
            .map(str::to_string)
    }
}
