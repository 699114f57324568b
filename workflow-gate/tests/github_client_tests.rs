use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;
use workflow_gate::github::{
    EventKind, GitHubClient, RepoRef, RunConclusion, RunFilter, RunId, RunQueryClient, RunStatus,
};
use workflow_gate::WorkflowGateError;

fn client(server: &MockServer) -> GitHubClient {
    GitHubClient::new(
        &server.base_url(),
        "secret-token",
        RepoRef::parse("octo/repo").unwrap(),
        Duration::from_secs(5),
    )
    .unwrap()
}

fn filter(workflow: &str, event: EventKind, branch: Option<&str>) -> RunFilter {
    RunFilter {
        workflow_id: workflow.to_string(),
        event,
        branch: branch.map(str::to_string),
        page_size: 10,
    }
}

#[tokio::test]
async fn test_list_runs_sends_filter_and_headers() {
    let server = MockServer::start_async().await;
    let listing = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/repos/octo/repo/actions/workflows/build.yml/runs")
                .query_param("event", "push")
                .query_param("per_page", "10")
                .query_param("branch", "main")
                .header("authorization", "Bearer secret-token")
                .header("x-github-api-version", "2022-11-28");
            then.status(200).json_body(json!({
                "total_count": 2,
                "workflow_runs": [
                    {
                        "id": 30433642,
                        "name": "Build",
                        "head_sha": "acb5820ced9479c074f688cc328bf03f341a511d",
                        "head_branch": "main",
                        "event": "push",
                        "status": "completed",
                        "conclusion": "success",
                        "created_at": "2024-01-22T19:33:08Z",
                        "html_url": "https://github.com/octo/repo/actions/runs/30433642"
                    },
                    {
                        "id": 30433643,
                        "name": "Build",
                        "head_sha": "0000000000000000000000000000000000000000",
                        "head_branch": "main",
                        "event": "push",
                        "status": "queued",
                        "conclusion": null,
                        "created_at": "2024-01-22T19:35:00Z",
                        "html_url": null
                    }
                ]
            }));
        })
        .await;

    let runs = client(&server)
        .list_runs(&filter("build.yml", EventKind::Push, Some("main")))
        .await
        .unwrap();

    listing.assert_async().await;
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].id, RunId(30433642));
    assert_eq!(runs[0].status, RunStatus::Completed);
    assert_eq!(runs[0].conclusion, Some(RunConclusion::Success));
    assert_eq!(runs[1].status, RunStatus::Queued);
    assert_eq!(runs[1].conclusion, None);
}

#[tokio::test]
async fn test_list_runs_by_numeric_workflow_id() {
    let server = MockServer::start_async().await;
    let listing = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/repos/octo/repo/actions/workflows/1234/runs")
                .query_param("event", "pull_request_target");
            then.status(200)
                .json_body(json!({"total_count": 0, "workflow_runs": []}));
        })
        .await;

    let runs = client(&server)
        .list_runs(&filter("1234", EventKind::PullRequestTarget, None))
        .await
        .unwrap();

    listing.assert_async().await;
    assert!(runs.is_empty());
}

#[tokio::test]
async fn test_missing_workflow_is_not_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/repos/octo/repo/actions/workflows/missing.yml/runs");
            then.status(404).json_body(json!({"message": "Not Found"}));
        })
        .await;

    let err = client(&server)
        .list_runs(&filter("missing.yml", EventKind::Push, None))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_server_error_is_api_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/repos/octo/repo/actions/workflows/build.yml/runs");
            then.status(500).body("upstream exploded");
        })
        .await;

    let err = client(&server)
        .list_runs(&filter("build.yml", EventKind::Push, None))
        .await
        .unwrap_err();
    match err {
        WorkflowGateError::Api { status, message } => {
            assert_eq!(status, 500);
            assert!(message.contains("upstream exploded"));
        }
        other => panic!("expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_listing_is_an_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/repos/octo/repo/actions/workflows/build.yml/runs");
            then.status(200).body("not json");
        })
        .await;

    let err = client(&server)
        .list_runs(&filter("build.yml", EventKind::Push, None))
        .await
        .unwrap_err();
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn test_get_own_run() {
    let server = MockServer::start_async().await;
    let lookup = server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/octo/repo/actions/runs/987");
            then.status(200).json_body(json!({
                "id": 987,
                "created_at": "2024-01-22T19:33:08Z",
                "status": "in_progress"
            }));
        })
        .await;

    let own = client(&server).get_own_run(RunId(987)).await.unwrap();

    lookup.assert_async().await;
    assert_eq!(own.id, RunId(987));
    assert_eq!(own.created_at.to_rfc3339(), "2024-01-22T19:33:08+00:00");
}

#[tokio::test]
async fn test_transport_failure_keeps_cause_as_source() {
    let client = GitHubClient::new(
        "http://127.0.0.1:1",
        "secret-token",
        RepoRef::parse("octo/repo").unwrap(),
        Duration::from_secs(5),
    )
    .unwrap();

    let err = client
        .list_runs(&filter("build.yml", EventKind::Push, None))
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowGateError::Http(_)));
    assert_eq!(err.to_string(), "HTTP request failed");
    assert!(std::error::Error::source(&err).is_some());
}
