//! Test utilities for workflow gate tests
//!
//! Provides an in-memory [`RunQueryClient`] with scripted responses plus
//! builders for the runs, triggers and contexts the tests pass around.
//!
//! # Scripting
//!
//! Responses are queued per `(workflow, event)` pair. Each `list_runs`
//! call pops the next response; the last one keeps being returned, so a
//! single `push_runs` describes a steady state. Unscripted pairs answer
//! with an empty listing.
//!
//! ```no_run
//! use workflow_gate::github::EventKind;
//! use workflow_gate::test_utils::{run, MockRunQueryClient};
//!
//! let client = MockRunQueryClient::new();
//! client.push_runs("build.yml", EventKind::Push, vec![run(1, "abc", 0, EventKind::Push)]);
//! ```

use crate::config::{DebugLevel, GateConfig, DEFAULT_API_URL, DEFAULT_PAGE_SIZE};
use crate::context::ActionContext;
use crate::error::{Result, WorkflowGateError};
use crate::github::{
    EventKind, OwnRun, RepoRef, RunConclusion, RunFilter, RunId, RunQueryClient, RunStatus,
    RunSummary,
};
use crate::trigger::TriggerIdentity;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Base instant all test timestamps are relative to
const BASE_MILLIS: i64 = 1_700_000_000_000;

type ScriptKey = (String, EventKind);

/// In-memory run query client with scripted listings
#[derive(Debug, Default)]
pub struct MockRunQueryClient {
    own_runs: Mutex<HashMap<RunId, DateTime<Utc>>>,
    scripts: Mutex<HashMap<ScriptKey, VecDeque<Result<Vec<RunSummary>>>>>,
    calls: Mutex<Vec<RunFilter>>,
    own_run_calls: Mutex<Vec<RunId>>,
}

impl MockRunQueryClient {
    /// Create a client with no scripted responses
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `get_own_run` answer for `run_id`
    pub fn set_own_run(&self, run_id: RunId, created_at: DateTime<Utc>) {
        self.own_runs
            .lock()
            .unwrap()
            .insert(run_id, created_at);
    }

    /// Queue a listing for `workflow` queried under `event`
    pub fn push_runs(&self, workflow: &str, event: EventKind, runs: Vec<RunSummary>) {
        self.push(workflow, event, Ok(runs));
    }

    /// Queue an error for `workflow` queried under `event`
    pub fn push_error(&self, workflow: &str, event: EventKind, error: WorkflowGateError) {
        self.push(workflow, event, Err(error));
    }

    /// Filters passed to `list_runs`, in call order
    pub fn list_calls(&self) -> Vec<RunFilter> {
        self.calls.lock().unwrap().clone()
    }

    /// Run ids passed to `get_own_run`, in call order
    pub fn own_run_calls(&self) -> Vec<RunId> {
        self.own_run_calls.lock().unwrap().clone()
    }

    fn push(&self, workflow: &str, event: EventKind, response: Result<Vec<RunSummary>>) {
        self.scripts
            .lock()
            .unwrap()
            .entry((workflow.to_string(), event))
            .or_default()
            .push_back(response);
    }

    fn next_response(&self, key: &ScriptKey) -> Result<Vec<RunSummary>> {
        let mut scripts = self.scripts.lock().unwrap();
        let Some(queue) = scripts.get_mut(key) else {
            return Ok(Vec::new());
        };

        if queue.len() > 1 {
            return queue.pop_front().unwrap_or_else(|| Ok(Vec::new()));
        }
        match queue.front() {
            Some(Ok(runs)) => Ok(runs.clone()),
            Some(Err(error)) => Err(replay_error(error)),
            None => Ok(Vec::new()),
        }
    }
}

/// Rebuild a scripted error so it can be returned more than once
fn replay_error(error: &WorkflowGateError) -> WorkflowGateError {
    match error {
        WorkflowGateError::NotFound { resource } => WorkflowGateError::NotFound {
            resource: resource.clone(),
        },
        WorkflowGateError::Api { status, message } => WorkflowGateError::Api {
            status: *status,
            message: message.clone(),
        },
        other => WorkflowGateError::Context {
            message: other.to_string(),
            source: other.to_string().into(),
        },
    }
}

#[async_trait]
impl RunQueryClient for MockRunQueryClient {
    async fn get_own_run(&self, run_id: RunId) -> Result<OwnRun> {
        self.own_run_calls.lock().unwrap().push(run_id);
        let created_at = self.own_runs.lock().unwrap().get(&run_id).copied();
        created_at
            .map(|created_at| OwnRun {
                id: run_id,
                created_at,
            })
            .ok_or_else(|| WorkflowGateError::NotFound {
                resource: format!("run {run_id}"),
            })
    }

    async fn list_runs(&self, filter: &RunFilter) -> Result<Vec<RunSummary>> {
        self.calls.lock().unwrap().push(filter.clone());
        self.next_response(&(filter.workflow_id.clone(), filter.event.clone()))
    }
}

/// A fixed instant offset by `millis`
pub fn timestamp(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(BASE_MILLIS + millis).expect("timestamp in range")
}

/// An in-progress run created `created_ms` after the base instant
pub fn run(id: u64, head_sha: &str, created_ms: i64, event: EventKind) -> RunSummary {
    RunSummary {
        id: RunId(id),
        name: Some(format!("run-{id}")),
        head_sha: head_sha.to_string(),
        head_branch: Some("main".to_string()),
        event,
        status: RunStatus::InProgress,
        conclusion: None,
        created_at: timestamp(created_ms),
        html_url: Some(format!("https://github.com/octo/repo/actions/runs/{id}")),
    }
}

/// A completed run with the given conclusion
pub fn completed_run(
    id: u64,
    head_sha: &str,
    created_ms: i64,
    event: EventKind,
    conclusion: RunConclusion,
) -> RunSummary {
    RunSummary {
        status: RunStatus::Completed,
        conclusion: Some(conclusion),
        ..run(id, head_sha, created_ms, event)
    }
}

/// A trigger identity at `head_sha` created `created_ms` after the base instant
pub fn trigger(head_sha: &str, created_ms: i64, event: EventKind) -> TriggerIdentity {
    TriggerIdentity::new(head_sha, timestamp(created_ms), event)
}

/// An action context for `octo/repo`, run 1001
pub fn action_context(event: EventKind, git_ref: &str, payload: Value) -> ActionContext {
    ActionContext {
        repository: RepoRef {
            owner: "octo".to_string(),
            name: "repo".to_string(),
        },
        event,
        git_ref: git_ref.to_string(),
        head_ref: None,
        sha: "0123456789abcdef".to_string(),
        run_id: RunId(1001),
        payload,
    }
}

/// A valid configuration waiting on `workflows`
pub fn gate_config(workflows: &[&str], interval_seconds: u64, max_seconds: u64) -> GateConfig {
    GateConfig {
        wait_interval_seconds: interval_seconds,
        wait_max_seconds: max_seconds,
        repo_token: "test-token".to_string(),
        workflows: workflows.iter().map(|w| w.to_string()).collect(),
        debug: DebugLevel::Off,
        page_size: DEFAULT_PAGE_SIZE,
        api_url: DEFAULT_API_URL.to_string(),
        request_timeout_seconds: 30,
    }
}
