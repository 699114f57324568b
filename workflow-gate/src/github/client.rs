//! Run query client and its GitHub REST implementation

use super::{OwnRun, RepoRef, RunFilter, RunId, RunSummary, WorkflowRunsPage};
use crate::error::{ConfigError, ErrorContext, Result, WorkflowGateError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Longest response body excerpt carried in an API error
const MAX_ERROR_BODY_CHARS: usize = 800;

/// GitHub REST API version sent with every request
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Source of workflow run listings.
///
/// The polling loop only ever talks to the remote CI system through this
/// trait, which keeps it testable against scripted responses.
#[async_trait]
pub trait RunQueryClient: Send + Sync {
    /// Fetch the calling run by id
    async fn get_own_run(&self, run_id: RunId) -> Result<OwnRun>;

    /// List the most recent runs matching `filter`, newest first
    async fn list_runs(&self, filter: &RunFilter) -> Result<Vec<RunSummary>>;
}

/// [`RunQueryClient`] backed by the GitHub Actions REST API
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_base: Url,
    repo: RepoRef,
}

impl GitHubClient {
    /// Create a client for `repo` talking to `api_base`.
    ///
    /// `api_base` is `https://api.github.com` for github.com and
    /// `https://<host>/api/v3` for GitHub Enterprise Server.
    pub fn new(api_base: &str, token: &str, repo: RepoRef, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("workflow-gate/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.trim())).map_err(|_| {
            ConfigError::Invalid {
                name: "repo-token".to_string(),
                reason: "token contains characters not allowed in an HTTP header".to_string(),
            }
        })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        let api_base = Url::parse(api_base.trim_end_matches('/')).map_err(|e| {
            ConfigError::Invalid {
                name: "api-url".to_string(),
                reason: e.to_string(),
            }
        })?;
        if api_base.cannot_be_a_base() {
            return Err(ConfigError::Invalid {
                name: "api-url".to_string(),
                reason: format!("'{api_base}' cannot be used as a base URL"),
            }
            .into());
        }

        Ok(Self {
            http,
            api_base,
            repo,
        })
    }

    /// Build an endpoint URL below `/repos/{owner}/{repo}`.
    ///
    /// Each segment is percent-encoded, so workflow file names such as
    /// `build.yml` and numeric ids both round-trip safely.
    fn repo_endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(["repos", self.repo.owner.as_str(), self.repo.name.as_str()])
                .extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            tracing::debug!("GitHub API {} returned 404", operation);
            return Err(WorkflowGateError::NotFound {
                resource: operation.to_string(),
            });
        }
        if !status.is_success() {
            return Err(WorkflowGateError::Api {
                status: status.as_u16(),
                message: truncate_for_error(&body, MAX_ERROR_BODY_CHARS),
            });
        }

        tracing::trace!("GitHub API {} response: {}", operation, body);
        serde_json::from_str(&body).with_context(|| format!("Failed to decode {operation}"))
    }
}

#[async_trait]
impl RunQueryClient for GitHubClient {
    async fn get_own_run(&self, run_id: RunId) -> Result<OwnRun> {
        let run_id = run_id.to_string();
        let url = self.repo_endpoint(&["actions", "runs", &run_id]);
        self.get_json(&format!("run {run_id}"), self.http.get(url))
            .await
    }

    async fn list_runs(&self, filter: &RunFilter) -> Result<Vec<RunSummary>> {
        let url = self.repo_endpoint(&["actions", "workflows", &filter.workflow_id, "runs"]);

        let mut query = vec![
            ("event", filter.event.as_str().to_string()),
            ("per_page", filter.page_size.to_string()),
        ];
        if let Some(branch) = &filter.branch {
            query.push(("branch", branch.clone()));
        }

        let operation = format!(
            "runs of workflow '{}' for event '{}'",
            filter.workflow_id, filter.event
        );
        let page: WorkflowRunsPage = self
            .get_json(&operation, self.http.get(url).query(&query))
            .await?;

        tracing::debug!(
            "Listed {} of {} {}",
            page.workflow_runs.len(),
            page.total_count,
            operation
        );
        Ok(page.workflow_runs)
    }
}

fn truncate_for_error(body: &str, max_chars: usize) -> String {
    if body.chars().count() <= max_chars {
        return body.to_string();
    }
    let truncated: String = body.chars().take(max_chars).collect();
    format!("{truncated}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_base: &str) -> GitHubClient {
        GitHubClient::new(
            api_base,
            "token",
            RepoRef::parse("octo/repo").unwrap(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_repo_endpoint_encodes_segments() {
        let client = client("https://api.github.com");
        let url = client.repo_endpoint(&["actions", "workflows", "ci checks.yml", "runs"]);
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/octo/repo/actions/workflows/ci%20checks.yml/runs"
        );
    }

    #[test]
    fn test_repo_endpoint_keeps_enterprise_prefix() {
        let client = client("https://ghe.example.com/api/v3/");
        let url = client.repo_endpoint(&["actions", "runs", "42"]);
        assert_eq!(
            url.as_str(),
            "https://ghe.example.com/api/v3/repos/octo/repo/actions/runs/42"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let result = GitHubClient::new(
            "not a url",
            "token",
            RepoRef::parse("octo/repo").unwrap(),
            Duration::from_secs(5),
        );
        assert!(matches!(
            result,
            Err(WorkflowGateError::Config(ConfigError::Invalid { .. }))
        ));
    }

    #[test]
    fn test_rejects_token_with_newline() {
        let result = GitHubClient::new(
            "https://api.github.com",
            "abc\ndef",
            RepoRef::parse("octo/repo").unwrap(),
            Duration::from_secs(5),
        );
        assert!(matches!(
            result,
            Err(WorkflowGateError::Config(ConfigError::Invalid { .. }))
        ));
    }

    #[test]
    fn test_truncate_for_error() {
        assert_eq!(truncate_for_error("short", 10), "short");
        assert_eq!(truncate_for_error("abcdef", 3), "abc...");
        assert_eq!(truncate_for_error("ééééé", 2), "éé...");
    }
}
