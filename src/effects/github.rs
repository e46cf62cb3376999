//! GitHub API effect types.
//!
//! These types describe GitHub API operations as data, without executing them.
//! The interpreter in [`crate::github`] executes them against the real API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{
    ChangedFile, CommentId, PrNumber, RepoId, RunConclusion, RunStatus, Sha, WorkflowId,
    WorkflowRunState,
};

/// GitHub reaction types.
///
/// These correspond to the reactions available on GitHub comments and PRs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reaction {
    /// +1 / thumbs up
    ThumbsUp,
    /// -1 / thumbs down
    ThumbsDown,
    Laugh,
    /// Hooray / tada
    Hooray,
    Confused,
    Heart,
    Rocket,
    Eyes,
}

impl Reaction {
    /// Returns the GitHub API content string for this reaction.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Reaction::ThumbsUp => "+1",
            Reaction::ThumbsDown => "-1",
            Reaction::Laugh => "laugh",
            Reaction::Hooray => "hooray",
            Reaction::Confused => "confused",
            Reaction::Heart => "heart",
            Reaction::Rocket => "rocket",
            Reaction::Eyes => "eyes",
        }
    }
}

/// Inputs passed to a `workflow_dispatch` event, keyed by input name.
pub type DispatchInputs = BTreeMap<String, String>;

/// A GitHub API effect.
///
/// Each variant describes a GitHub API operation. Effects are repo-scoped:
/// the interpreter is constructed with a `RepoId`, so effects don't include it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GitHubEffect {
    // ─── Pull requests ────────────────────────────────────────────────────────
    /// List all open PRs in the repository (every page).
    ListOpenPrs,

    /// List the files changed by a PR (every page).
    ListPrFiles { pr: PrNumber },

    // ─── Repository content ───────────────────────────────────────────────────
    /// Fetch a file's text at a git ref.
    GetFileContents { path: String, git_ref: String },

    // ─── Organization ─────────────────────────────────────────────────────────
    /// Look up a user's membership in a team of the repository owner's org.
    GetTeamMembership { team: String, user: String },

    // ─── Actions ──────────────────────────────────────────────────────────────
    /// List runs of a workflow for one head commit, most recent first.
    ListWorkflowRuns { workflow: WorkflowId, head_sha: Sha },

    /// Fetch a workflow's metadata by its file name.
    GetWorkflow { workflow: WorkflowId },

    /// Create a `workflow_dispatch` event for a workflow.
    DispatchWorkflow {
        workflow: WorkflowId,
        git_ref: String,
        inputs: DispatchInputs,
    },

    /// List the jobs of a workflow run.
    ListWorkflowJobs { run_id: u64 },

    /// Re-run a single job.
    RerunJob { job_id: u64 },

    /// Re-run every failed job of a workflow run.
    RerunFailedJobs { run_id: u64 },

    // ─── Checks ───────────────────────────────────────────────────────────────
    /// Create a check run on a commit.
    CreateCheckRun {
        name: String,
        head_sha: Sha,
        status: RunStatus,
        conclusion: RunConclusion,
    },

    /// Fetch the required status checks of a branch's protection rules.
    GetRequiredChecks { branch: String },

    // ─── Comments ─────────────────────────────────────────────────────────────
    /// Add a reaction to an issue comment.
    AddReaction {
        comment_id: CommentId,
        reaction: Reaction,
    },
}

impl GitHubEffect {
    /// Short snake_case name of the operation, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            GitHubEffect::ListOpenPrs => "list_open_prs",
            GitHubEffect::ListPrFiles { .. } => "list_pr_files",
            GitHubEffect::GetFileContents { .. } => "get_file_contents",
            GitHubEffect::GetTeamMembership { .. } => "get_team_membership",
            GitHubEffect::ListWorkflowRuns { .. } => "list_workflow_runs",
            GitHubEffect::GetWorkflow { .. } => "get_workflow",
            GitHubEffect::DispatchWorkflow { .. } => "dispatch_workflow",
            GitHubEffect::ListWorkflowJobs { .. } => "list_workflow_jobs",
            GitHubEffect::RerunJob { .. } => "rerun_job",
            GitHubEffect::RerunFailedJobs { .. } => "rerun_failed_jobs",
            GitHubEffect::CreateCheckRun { .. } => "create_check_run",
            GitHubEffect::GetRequiredChecks { .. } => "get_required_checks",
            GitHubEffect::AddReaction { .. } => "add_reaction",
        }
    }
}

// ─── Response Types ───────────────────────────────────────────────────────────

/// PR data returned from the GitHub API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrData {
    pub number: PrNumber,
    pub head_sha: Sha,
    /// The head branch name.
    pub head_ref: String,
    /// Repository the head branch lives in. `None` when the fork was deleted.
    pub head_repo: Option<RepoId>,
    /// The base branch name.
    pub base_ref: String,
}

impl PrData {
    /// Whether the head branch lives outside the given base repository.
    pub fn is_from_fork(&self, base: &RepoId) -> bool {
        self.head_repo.as_ref() != Some(base)
    }
}

/// Workflow metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowData {
    /// The display name from the workflow file's `name:` key.
    pub name: String,
}

/// A job belonging to a workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobData {
    pub id: u64,
    pub name: String,
}

/// A required status check from branch protection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredCheck {
    /// The check's context name.
    pub context: String,
    /// The GitHub App the check must come from. `None` (or 0) accepts any source.
    pub app_id: Option<u64>,
}

impl RequiredCheck {
    /// Whether any app (or a plain commit status) may satisfy this check.
    pub fn is_app_agnostic(&self) -> bool {
        matches!(self.app_id, None | Some(0))
    }
}

/// Response from a GitHub effect.
///
/// Each variant corresponds to the response from a particular effect type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum GitHubResponse {
    /// Response to `ListOpenPrs`.
    PrList(Vec<PrData>),

    /// Response to `ListPrFiles`.
    Files(Vec<ChangedFile>),

    /// Response to `GetFileContents`. `None` when the file doesn't exist at the ref.
    FileContents(Option<String>),

    /// Response to `GetTeamMembership`: the membership state (`active`,
    /// `pending`), or `None` when the user is not a member.
    TeamMembership(Option<String>),

    /// Response to `ListWorkflowRuns`.
    WorkflowRuns(Vec<WorkflowRunState>),

    /// Response to `GetWorkflow`.
    Workflow(WorkflowData),

    /// Response to `DispatchWorkflow`.
    WorkflowDispatched,

    /// Response to `ListWorkflowJobs`.
    WorkflowJobs(Vec<JobData>),

    /// Response to `RerunJob`.
    JobRerun,

    /// Response to `RerunFailedJobs`.
    FailedJobsRerun,

    /// Response to `CreateCheckRun`.
    CheckRunCreated { id: u64 },

    /// Response to `GetRequiredChecks`.
    RequiredChecks(Vec<RequiredCheck>),

    /// Response to `AddReaction`.
    ReactionAdded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reaction_api_str_values() {
        assert_eq!(Reaction::ThumbsUp.as_api_str(), "+1");
        assert_eq!(Reaction::ThumbsDown.as_api_str(), "-1");
        assert_eq!(Reaction::Hooray.as_api_str(), "hooray");
        assert_eq!(Reaction::Rocket.as_api_str(), "rocket");
        assert_eq!(Reaction::Eyes.as_api_str(), "eyes");
    }

    #[test]
    fn effect_serializes_with_type_tag() {
        let effect = GitHubEffect::ListWorkflowRuns {
            workflow: WorkflowId::from("ci.yaml"),
            head_sha: Sha::from("abc123"),
        };
        let json = serde_json::to_value(&effect).unwrap();
        assert_eq!(json["type"], "list_workflow_runs");
        assert_eq!(json["type"], effect.name());
        assert_eq!(json["workflow"], "ci.yaml");
        assert_eq!(json["head_sha"], "abc123");
    }

    #[test]
    fn dispatch_inputs_compare_independent_of_insertion_order() {
        let mut a = DispatchInputs::new();
        a.insert("SHA".to_string(), "abc".to_string());
        a.insert("PR-number".to_string(), "7".to_string());
        let mut b = DispatchInputs::new();
        b.insert("PR-number".to_string(), "7".to_string());
        b.insert("SHA".to_string(), "abc".to_string());

        let workflow = WorkflowId::from("ci.yaml");
        assert_eq!(
            GitHubEffect::DispatchWorkflow {
                workflow: workflow.clone(),
                git_ref: "main".to_string(),
                inputs: a,
            },
            GitHubEffect::DispatchWorkflow {
                workflow,
                git_ref: "main".to_string(),
                inputs: b,
            }
        );
    }

    #[test]
    fn fork_detection_compares_head_repository() {
        let base = RepoId::new("cilium", "cilium");
        let mut pr = PrData {
            number: PrNumber(1),
            head_sha: Sha::from("abc"),
            head_ref: "feature".to_string(),
            head_repo: Some(base.clone()),
            base_ref: "main".to_string(),
        };
        assert!(!pr.is_from_fork(&base));

        pr.head_repo = Some(RepoId::new("someone", "cilium"));
        assert!(pr.is_from_fork(&base));

        pr.head_repo = Some(RepoId::new("cilium", "cilium-fork"));
        assert!(pr.is_from_fork(&base));

        pr.head_repo = None;
        assert!(pr.is_from_fork(&base));
    }

    #[test]
    fn app_agnostic_checks() {
        let check = |app_id| RequiredCheck {
            context: "ci/lint".to_string(),
            app_id,
        };
        assert!(check(None).is_app_agnostic());
        assert!(check(Some(0)).is_app_agnostic());
        assert!(!check(Some(15368)).is_app_agnostic());
    }
}
