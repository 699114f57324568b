//! Candidate matching
//!
//! Picks, out of a page of recent runs of one workflow, the run that was
//! started by the same trigger as the caller.

use crate::github::{EventKind, RunSummary};
use crate::trigger::TriggerIdentity;
use chrono::{DateTime, Utc};

/// Window within which runs recorded under the paired pull request event
/// still count as the same trigger
pub const CROSS_EVENT_TOLERANCE_MS: i64 = 3000;

/// How a candidate's creation time is compared with the trigger's
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampRule {
    /// Same event: runs of one trigger share the creation instant
    Exact,
    /// Paired event: creation times differ by less than this many ms
    Within(i64),
}

impl TimestampRule {
    /// Rule for runs listed under `queried_event`
    pub fn for_query(queried_event: &EventKind, trigger: &TriggerIdentity) -> Self {
        if *queried_event == trigger.event {
            TimestampRule::Exact
        } else {
            TimestampRule::Within(CROSS_EVENT_TOLERANCE_MS)
        }
    }

    /// Whether `candidate` satisfies the rule against `expected`
    pub fn accepts(&self, candidate: DateTime<Utc>, expected: DateTime<Utc>) -> bool {
        match self {
            TimestampRule::Exact => candidate == expected,
            TimestampRule::Within(tolerance_ms) => {
                (candidate - expected).num_milliseconds().abs() < *tolerance_ms
            }
        }
    }
}

/// Find the run belonging to `trigger` among `runs` listed for `queried_event`.
///
/// Runs are filtered to the trigger's head commit, then to the creation
/// time rule. The first survivor in the order received wins; there is no
/// secondary tie-break.
pub fn find_candidate<'a>(
    runs: &'a [RunSummary],
    trigger: &TriggerIdentity,
    queried_event: &EventKind,
) -> Option<&'a RunSummary> {
    let rule = TimestampRule::for_query(queried_event, trigger);

    let mut same_commit = runs
        .iter()
        .filter(|run| run.head_sha == trigger.head_sha)
        .peekable();
    if same_commit.peek().is_none() {
        tracing::debug!(
            "No {} run among {} listed is at commit {}",
            queried_event,
            runs.len(),
            trigger.head_sha
        );
        return None;
    }

    let candidate = same_commit.find(|run| rule.accepts(run.created_at, trigger.created_at));
    match candidate {
        Some(run) => tracing::debug!(
            "Matched run {} ({}) created {}",
            run.id,
            run.status,
            run.created_at.to_rfc3339()
        ),
        None => tracing::debug!(
            "Runs at commit {} exist but none was created at {} ({:?})",
            trigger.head_sha,
            trigger.created_at.to_rfc3339(),
            rule
        ),
    }
    candidate
}
