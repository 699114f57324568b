//! Identity of the triggering event
//!
//! Sibling workflows started by the same push or pull request share the
//! head commit and, within one event, the exact creation instant. The
//! identity is computed once per invocation and reused unchanged for every
//! matching attempt.

use crate::context::ActionContext;
use crate::error::Result;
use crate::github::{EventKind, RunQueryClient};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// What a sibling run must look like to belong to this trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerIdentity {
    /// Head commit of the triggering event
    pub head_sha: String,
    /// Creation time of the calling run
    pub created_at: DateTime<Utc>,
    /// Event that started the calling run
    pub event: EventKind,
}

impl TriggerIdentity {
    /// Build an identity from known parts
    pub fn new(head_sha: impl Into<String>, created_at: DateTime<Utc>, event: EventKind) -> Self {
        Self {
            head_sha: head_sha.into(),
            created_at,
            event,
        }
    }

    /// Look up the calling run and derive the identity from it
    pub async fn resolve(context: &ActionContext, client: &dyn RunQueryClient) -> Result<Self> {
        let head_sha = context.head_sha()?;
        let own_run = client.get_own_run(context.run_id).await?;

        let identity = Self::new(head_sha, own_run.created_at, context.event.clone());
        tracing::info!(
            "Waiting on runs for {} event at commit {} created {}",
            identity.event,
            identity.head_sha,
            identity.created_at.to_rfc3339()
        );
        Ok(identity)
    }
}
