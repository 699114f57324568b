//! End-to-end runs of `wait` and `status` against a mocked GitHub API

use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

const SHA: &str = "5f1e0c4b2a9d8e7f6a5b4c3d2e1f0a9b8c7d6e5f";
const CREATED: &str = "2024-03-01T12:00:00Z";

/// A command that looks like a push-triggered Actions step talking to `server`
fn action_command(server: &MockServer, dir: &TempDir, workflows: &str) -> Command {
    let mut cmd = Command::cargo_bin("workflow-gate").unwrap();
    cmd.env_clear()
        .current_dir(dir.path())
        .env("GITHUB_API_URL", server.base_url())
        .env("GITHUB_REPOSITORY", "octo/repo")
        .env("GITHUB_EVENT_NAME", "push")
        .env("GITHUB_REF", "refs/heads/main")
        .env("GITHUB_SHA", SHA)
        .env("GITHUB_RUN_ID", "42")
        .env("INPUT_REPO-TOKEN", "secret")
        .env("INPUT_WORKFLOWS", workflows)
        .env("INPUT_WAIT-INTERVAL-SECONDS", "1")
        .env("INPUT_WAIT-MAX-SECONDS", "1");
    cmd
}

fn mock_own_run(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/repos/octo/repo/actions/runs/42");
        then.status(200)
            .json_body(json!({"id": 42, "created_at": CREATED}));
    });
}

fn listing(id: u64, status: &str, conclusion: Value) -> Value {
    json!({
        "total_count": 1,
        "workflow_runs": [{
            "id": id,
            "name": "CI",
            "head_sha": SHA,
            "head_branch": "main",
            "event": "push",
            "status": status,
            "conclusion": conclusion,
            "created_at": CREATED,
            "html_url": format!("https://github.com/octo/repo/actions/runs/{id}")
        }]
    })
}

#[test]
fn test_wait_succeeds_when_sibling_succeeded() {
    let server = MockServer::start();
    mock_own_run(&server);
    let runs = server.mock(|when, then| {
        when.method(GET)
            .path("/repos/octo/repo/actions/workflows/build.yml/runs")
            .query_param("event", "push")
            .query_param("branch", "main");
        then.status(200)
            .json_body(listing(7, "completed", json!("success")));
    });

    let dir = TempDir::new().unwrap();
    action_command(&server, &dir, "build.yml\n")
        .arg("wait")
        .assert()
        .success()
        .stdout(predicate::str::contains("::error::").not());

    runs.assert_hits(1);
}

#[test]
fn test_wait_fails_on_sibling_failure() {
    let server = MockServer::start();
    mock_own_run(&server);
    server.mock(|when, then| {
        when.method(GET)
            .path("/repos/octo/repo/actions/workflows/test.yml/runs");
        then.status(200)
            .json_body(listing(8, "completed", json!("failure")));
    });

    let dir = TempDir::new().unwrap();
    action_command(&server, &dir, "test.yml")
        .arg("wait")
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "::error::Workflow 'test.yml' finished with conclusion 'failure'",
        ));
}

#[test]
fn test_wait_times_out_on_pending_sibling() {
    let server = MockServer::start();
    mock_own_run(&server);
    server.mock(|when, then| {
        when.method(GET)
            .path("/repos/octo/repo/actions/workflows/slow.yml/runs");
        then.status(200)
            .json_body(listing(9, "in_progress", Value::Null));
    });

    let dir = TempDir::new().unwrap();
    action_command(&server, &dir, "slow.yml")
        .arg("wait")
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "::error::Time exceeded the maximum 1 seconds",
        ));
}

#[test]
fn test_wait_reports_api_errors() {
    let server = MockServer::start();
    mock_own_run(&server);
    server.mock(|when, then| {
        when.method(GET)
            .path("/repos/octo/repo/actions/workflows/build.yml/runs");
        then.status(401).json_body(json!({"message": "Bad credentials"}));
    });

    let dir = TempDir::new().unwrap();
    action_command(&server, &dir, "build.yml")
        .arg("wait")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("::error::"))
        .stdout(predicate::str::contains("401"));
}

#[test]
fn test_status_json_reports_every_workflow() {
    let server = MockServer::start();
    mock_own_run(&server);
    server.mock(|when, then| {
        when.method(GET)
            .path("/repos/octo/repo/actions/workflows/build.yml/runs");
        then.status(200)
            .json_body(listing(7, "completed", json!("success")));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/repos/octo/repo/actions/workflows/deploy.yml/runs");
        then.status(404).json_body(json!({"message": "Not Found"}));
    });

    let dir = TempDir::new().unwrap();
    let output = action_command(&server, &dir, "build.yml\ndeploy.yml")
        .args(["status", "--format", "json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let document: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(document["trigger"]["head_sha"], SHA);
    assert_eq!(document["workflows"][0]["workflow"], "build.yml");
    assert_eq!(document["workflows"][0]["status"]["state"], "succeeded");
    assert_eq!(document["workflows"][1]["status"]["state"], "pending");
    assert_eq!(document["workflows"][1]["status"]["reason"]["reason"], "not_found");
}
