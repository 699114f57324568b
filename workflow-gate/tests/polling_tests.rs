use serde_json::json;
use workflow_gate::github::{EventKind, RunConclusion};
use workflow_gate::test_utils::{
    action_context, completed_run, gate_config, run, timestamp, MockRunQueryClient,
};
use workflow_gate::{PollOutcome, PollingLoop, TriggerIdentity, WorkflowResolver};

const HEAD: &str = "9f2c1e";

#[tokio::test(start_paused = true)]
async fn test_pull_request_waits_for_target_sibling() {
    let payload = json!({"pull_request": {"head": {"sha": HEAD, "ref": "feature/x"}}});
    let context = action_context(EventKind::PullRequest, "refs/pull/12/merge", payload);
    let client = MockRunQueryClient::new();
    client.set_own_run(context.run_id, timestamp(20_000));

    // The sibling only shows up under pull_request_target, 1.2s apart.
    client.push_runs(
        "deploy-preview.yml",
        EventKind::PullRequestTarget,
        vec![run(70, HEAD, 21_200, EventKind::PullRequestTarget)],
    );
    client.push_runs(
        "deploy-preview.yml",
        EventKind::PullRequestTarget,
        vec![completed_run(
            70,
            HEAD,
            21_200,
            EventKind::PullRequestTarget,
            RunConclusion::Success,
        )],
    );
    client.push_runs(
        "lint.yml",
        EventKind::PullRequest,
        vec![completed_run(
            71,
            HEAD,
            20_000,
            EventKind::PullRequest,
            RunConclusion::Success,
        )],
    );

    let config = gate_config(&["deploy-preview.yml", "lint.yml"], 15, 600);
    let trigger = TriggerIdentity::resolve(&context, &client).await.unwrap();
    let resolver = WorkflowResolver::new(&client, &trigger, context.branch(), config.page_size);
    let report = PollingLoop::new(&config, resolver).run().await.unwrap();

    assert_eq!(report.outcome, PollOutcome::Succeeded);
    assert_eq!(report.rounds, 2);
    assert_eq!(report.elapsed_seconds, 15);
    assert_eq!(report.resolved, vec!["deploy-preview.yml", "lint.yml"]);

    let calls = client.list_calls();
    assert!(calls
        .iter()
        .all(|call| call.branch.as_deref() == Some("feature/x")));
    assert_eq!(client.own_run_calls(), vec![context.run_id]);
}

#[tokio::test(start_paused = true)]
async fn test_push_sibling_failure_is_reported() {
    let context = action_context(EventKind::Push, "refs/heads/main", serde_json::Value::Null);
    let client = MockRunQueryClient::new();
    client.set_own_run(context.run_id, timestamp(0));
    client.push_runs(
        "build.yml",
        EventKind::Push,
        vec![
            completed_run(1, &context.sha, -60_000, EventKind::Push, RunConclusion::Success),
            completed_run(2, &context.sha, 0, EventKind::Push, RunConclusion::TimedOut),
        ],
    );

    let config = gate_config(&["build.yml"], 10, 60);
    let trigger = TriggerIdentity::resolve(&context, &client).await.unwrap();
    let resolver = WorkflowResolver::new(&client, &trigger, context.branch(), config.page_size);
    let report = PollingLoop::new(&config, resolver).run().await.unwrap();

    assert!(!report.outcome.is_success());
    assert_eq!(
        report.outcome.failure_message().as_deref(),
        Some("Workflow 'build.yml' finished with conclusion 'timed_out'")
    );
    assert_eq!(report.unresolved, vec!["build.yml"]);
}

#[tokio::test(start_paused = true)]
async fn test_run_of_an_earlier_push_is_ignored() {
    let context = action_context(EventKind::Push, "refs/heads/main", serde_json::Value::Null);
    let client = MockRunQueryClient::new();
    client.set_own_run(context.run_id, timestamp(5_000));
    // Same commit re-pushed earlier; its run must not satisfy this trigger.
    client.push_runs(
        "build.yml",
        EventKind::Push,
        vec![completed_run(1, &context.sha, 0, EventKind::Push, RunConclusion::Success)],
    );

    let config = gate_config(&["build.yml"], 30, 60);
    let trigger = TriggerIdentity::resolve(&context, &client).await.unwrap();
    let resolver = WorkflowResolver::new(&client, &trigger, context.branch(), config.page_size);
    let report = PollingLoop::new(&config, resolver).run().await.unwrap();

    assert_eq!(report.outcome, PollOutcome::TimedOut { max_seconds: 60 });
    assert_eq!(report.rounds, 3);
    assert_eq!(report.elapsed_seconds, 90);
}
