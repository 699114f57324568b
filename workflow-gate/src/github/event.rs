//! Triggering event kinds

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of event that triggered a workflow run.
///
/// Only the kinds the gate reasons about get their own variant, anything
/// else is carried through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    /// `push`
    Push,
    /// `pull_request`
    PullRequest,
    /// `pull_request_target`
    PullRequestTarget,
    /// Any other event name, e.g. `schedule` or `workflow_dispatch`
    Other(String),
}

impl EventKind {
    /// The event name as GitHub spells it
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Push => "push",
            EventKind::PullRequest => "pull_request",
            EventKind::PullRequestTarget => "pull_request_target",
            EventKind::Other(name) => name,
        }
    }

    /// Whether the run carries a pull request payload
    pub fn is_pull_request_family(&self) -> bool {
        matches!(self, EventKind::PullRequest | EventKind::PullRequestTarget)
    }

    /// The paired event kind to retry with when nothing matched.
    ///
    /// A pull request can start sibling workflows under either
    /// `pull_request` or `pull_request_target`, so each is the other's
    /// fallback. Other kinds have none.
    pub fn fallback(&self) -> Option<EventKind> {
        match self {
            EventKind::PullRequest => Some(EventKind::PullRequestTarget),
            EventKind::PullRequestTarget => Some(EventKind::PullRequest),
            _ => None,
        }
    }
}

impl From<&str> for EventKind {
    fn from(name: &str) -> Self {
        match name {
            "push" => EventKind::Push,
            "pull_request" => EventKind::PullRequest,
            "pull_request_target" => EventKind::PullRequestTarget,
            other => EventKind::Other(other.to_string()),
        }
    }
}

impl From<String> for EventKind {
    fn from(name: String) -> Self {
        EventKind::from(name.as_str())
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_and_unknown_events() {
        assert_eq!(EventKind::from("push"), EventKind::Push);
        assert_eq!(EventKind::from("pull_request"), EventKind::PullRequest);
        assert_eq!(
            EventKind::from("pull_request_target"),
            EventKind::PullRequestTarget
        );
        assert_eq!(
            EventKind::from("workflow_dispatch"),
            EventKind::Other("workflow_dispatch".to_string())
        );
        assert_eq!(EventKind::from("schedule").as_str(), "schedule");
    }

    #[test]
    fn test_fallback_pairs_pull_request_events() {
        assert_eq!(
            EventKind::PullRequest.fallback(),
            Some(EventKind::PullRequestTarget)
        );
        assert_eq!(
            EventKind::PullRequestTarget.fallback(),
            Some(EventKind::PullRequest)
        );
        assert_eq!(EventKind::Push.fallback(), None);
        assert_eq!(EventKind::from("merge_group").fallback(), None);
    }

    #[test]
    fn test_pull_request_family() {
        assert!(EventKind::PullRequest.is_pull_request_family());
        assert!(EventKind::PullRequestTarget.is_pull_request_family());
        assert!(!EventKind::Push.is_pull_request_family());
        assert!(!EventKind::from("pull_request_review").is_pull_request_family());
    }

    #[test]
    fn test_serde_uses_event_name() {
        let json = serde_json::to_string(&EventKind::PullRequestTarget).unwrap();
        assert_eq!(json, "\"pull_request_target\"");

        let parsed: EventKind = serde_json::from_str("\"release\"").unwrap();
        assert_eq!(parsed, EventKind::Other("release".to_string()));
    }
}
