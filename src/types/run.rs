//! Workflow run and changed-file types.
//!
//! These are minimal projections of GitHub's workflow-run and PR-file records:
//! only the fields the decision logic reads are kept.

use serde::{Deserialize, Serialize};

/// A file touched by a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChangedFile {
    pub filename: String,
}

impl ChangedFile {
    pub fn new(filename: impl Into<String>) -> Self {
        ChangedFile {
            filename: filename.into(),
        }
    }
}

/// Lifecycle status of a workflow run or check run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunStatus {
    Queued,
    InProgress,
    Completed,
    Waiting,
    Requested,
    Pending,
    /// Any status GitHub reports that this bot does not name.
    Other(String),
}

impl RunStatus {
    /// Returns the GitHub API string for this status.
    pub fn as_api_str(&self) -> &str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::Completed => "completed",
            RunStatus::Waiting => "waiting",
            RunStatus::Requested => "requested",
            RunStatus::Pending => "pending",
            RunStatus::Other(s) => s,
        }
    }
}

impl From<String> for RunStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "queued" => RunStatus::Queued,
            "in_progress" => RunStatus::InProgress,
            "completed" => RunStatus::Completed,
            "waiting" => RunStatus::Waiting,
            "requested" => RunStatus::Requested,
            "pending" => RunStatus::Pending,
            _ => RunStatus::Other(s),
        }
    }
}

impl From<RunStatus> for String {
    fn from(status: RunStatus) -> Self {
        status.as_api_str().to_string()
    }
}

/// Final outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunConclusion {
    Success,
    Failure,
    Skipped,
    Cancelled,
    Neutral,
    TimedOut,
    ActionRequired,
    Stale,
    Other(String),
}

impl RunConclusion {
    /// Returns the GitHub API string for this conclusion.
    pub fn as_api_str(&self) -> &str {
        match self {
            RunConclusion::Success => "success",
            RunConclusion::Failure => "failure",
            RunConclusion::Skipped => "skipped",
            RunConclusion::Cancelled => "cancelled",
            RunConclusion::Neutral => "neutral",
            RunConclusion::TimedOut => "timed_out",
            RunConclusion::ActionRequired => "action_required",
            RunConclusion::Stale => "stale",
            RunConclusion::Other(s) => s,
        }
    }
}

impl From<String> for RunConclusion {
    fn from(s: String) -> Self {
        match s.as_str() {
            "success" => RunConclusion::Success,
            "failure" => RunConclusion::Failure,
            "skipped" => RunConclusion::Skipped,
            "cancelled" => RunConclusion::Cancelled,
            "neutral" => RunConclusion::Neutral,
            "timed_out" => RunConclusion::TimedOut,
            "action_required" => RunConclusion::ActionRequired,
            "stale" => RunConclusion::Stale,
            _ => RunConclusion::Other(s),
        }
    }
}

impl From<RunConclusion> for String {
    fn from(conclusion: RunConclusion) -> Self {
        conclusion.as_api_str().to_string()
    }
}

/// The most recent run of a workflow for one commit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowRunState {
    pub id: u64,
    pub status: RunStatus,
    pub conclusion: Option<RunConclusion>,
}

impl WorkflowRunState {
    pub fn new(id: u64, status: RunStatus, conclusion: Option<RunConclusion>) -> Self {
        WorkflowRunState {
            id,
            status,
            conclusion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses_parse_to_variants() {
        assert_eq!(RunStatus::from("completed".to_string()), RunStatus::Completed);
        assert_eq!(RunStatus::from("in_progress".to_string()), RunStatus::InProgress);
    }

    #[test]
    fn unknown_status_is_preserved() {
        let status = RunStatus::from("cancelled".to_string());
        assert_eq!(status, RunStatus::Other("cancelled".to_string()));
        assert_eq!(status.as_api_str(), "cancelled");
    }

    #[test]
    fn run_state_deserializes_from_api_shape() {
        let run: WorkflowRunState = serde_json::from_str(
            r#"{"id": 7, "status": "completed", "conclusion": "timed_out"}"#,
        )
        .unwrap();
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.conclusion, Some(RunConclusion::TimedOut));

        let pending: WorkflowRunState =
            serde_json::from_str(r#"{"id": 8, "status": "queued", "conclusion": null}"#).unwrap();
        assert_eq!(pending.conclusion, None);
    }

    #[test]
    fn conclusion_serializes_as_api_string() {
        let json = serde_json::to_string(&RunConclusion::ActionRequired).unwrap();
        assert_eq!(json, "\"action_required\"");
    }
}
