//! GitHub Actions run queries
//!
//! Types describing workflow runs as the REST API reports them, and the
//! [`RunQueryClient`] seam the resolver queries through.

mod client;
mod event;
mod types;

pub use client::{GitHubClient, RunQueryClient};
pub use event::EventKind;
pub use types::{
    OwnRun, RepoRef, RunConclusion, RunFilter, RunId, RunStatus, RunSummary, WorkflowRunsPage,
};
