//! Shared test utilities: a recording GitHub interpreter and event fixtures.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Mutex;

use thiserror::Error;

use crate::effects::{
    GitHubEffect, GitHubInterpreter, GitHubResponse, JobData, PrData, RequiredCheck, WorkflowData,
};
use crate::types::{
    ChangedFile, CommentId, PrNumber, RepoId, Sha, WorkflowId, WorkflowRunState,
};
use crate::webhooks::events::{
    CommentAction, IssueCommentEvent, MergeGroupAction, MergeGroupEvent,
};

#[derive(Debug, Error)]
#[error("mock failure for {0}")]
pub struct MockError(pub &'static str);

/// GitHub interpreter that records every effect and answers from canned data.
///
/// Unconfigured lookups answer with empty lists, missing files, and
/// non-membership. Workflow names default to the workflow id.
#[derive(Debug, Default)]
pub struct MockGitHub {
    open_prs: Vec<PrData>,
    files: Vec<ChangedFile>,
    file_contents: Option<String>,
    memberships: HashMap<String, String>,
    runs: HashMap<WorkflowId, Vec<WorkflowRunState>>,
    workflow_names: HashMap<WorkflowId, String>,
    jobs: Vec<JobData>,
    required_checks: Vec<RequiredCheck>,
    failing: HashSet<&'static str>,
    recorded: Mutex<Vec<GitHubEffect>>,
}

impl MockGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_open_prs(mut self, prs: Vec<PrData>) -> Self {
        self.open_prs = prs;
        self
    }

    pub fn with_files(mut self, files: Vec<ChangedFile>) -> Self {
        self.files = files;
        self
    }

    pub fn with_file_contents(mut self, contents: Option<String>) -> Self {
        self.file_contents = contents;
        self
    }

    /// `state` is the membership state (`active`, `pending`); `None` means
    /// not a member.
    pub fn with_team_membership(mut self, team: &str, state: Option<&str>) -> Self {
        match state {
            Some(state) => {
                self.memberships.insert(team.to_string(), state.to_string());
            }
            None => {
                self.memberships.remove(team);
            }
        }
        self
    }

    pub fn with_workflow_runs(mut self, workflow: &str, runs: Vec<WorkflowRunState>) -> Self {
        self.runs.insert(WorkflowId::from(workflow), runs);
        self
    }

    pub fn with_workflow_name(mut self, workflow: &str, name: &str) -> Self {
        self.workflow_names
            .insert(WorkflowId::from(workflow), name.to_string());
        self
    }

    pub fn with_jobs(mut self, jobs: Vec<JobData>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_required_checks(mut self, checks: Vec<RequiredCheck>) -> Self {
        self.required_checks = checks;
        self
    }

    /// Makes every effect with this [`GitHubEffect::name`] fail.
    pub fn failing_on(mut self, effect: &'static str) -> Self {
        self.failing.insert(effect);
        self
    }

    /// Every effect interpreted so far, in order.
    pub fn recorded(&self) -> Vec<GitHubEffect> {
        self.recorded.lock().unwrap().clone()
    }

    fn respond(&self, effect: &GitHubEffect) -> Result<GitHubResponse, MockError> {
        if self.failing.contains(effect.name()) {
            return Err(MockError(effect.name()));
        }

        let response = match effect {
            GitHubEffect::ListOpenPrs => GitHubResponse::PrList(self.open_prs.clone()),
            GitHubEffect::ListPrFiles { .. } => GitHubResponse::Files(self.files.clone()),
            GitHubEffect::GetFileContents { .. } => {
                GitHubResponse::FileContents(self.file_contents.clone())
            }
            GitHubEffect::GetTeamMembership { team, .. } => {
                GitHubResponse::TeamMembership(self.memberships.get(team).cloned())
            }
            GitHubEffect::ListWorkflowRuns { workflow, .. } => {
                GitHubResponse::WorkflowRuns(self.runs.get(workflow).cloned().unwrap_or_default())
            }
            GitHubEffect::GetWorkflow { workflow } => GitHubResponse::Workflow(WorkflowData {
                name: self
                    .workflow_names
                    .get(workflow)
                    .cloned()
                    .unwrap_or_else(|| workflow.to_string()),
            }),
            GitHubEffect::DispatchWorkflow { .. } => GitHubResponse::WorkflowDispatched,
            GitHubEffect::ListWorkflowJobs { .. } => GitHubResponse::WorkflowJobs(self.jobs.clone()),
            GitHubEffect::RerunJob { .. } => GitHubResponse::JobRerun,
            GitHubEffect::RerunFailedJobs { .. } => GitHubResponse::FailedJobsRerun,
            GitHubEffect::CreateCheckRun { .. } => GitHubResponse::CheckRunCreated {
                id: self.recorded.lock().unwrap().len() as u64,
            },
            GitHubEffect::GetRequiredChecks { .. } => {
                GitHubResponse::RequiredChecks(self.required_checks.clone())
            }
            GitHubEffect::AddReaction { .. } => GitHubResponse::ReactionAdded,
        };
        Ok(response)
    }
}

impl GitHubInterpreter for MockGitHub {
    type Error = MockError;

    fn interpret(
        &self,
        effect: GitHubEffect,
    ) -> impl Future<Output = Result<GitHubResponse, Self::Error>> + Send {
        self.recorded.lock().unwrap().push(effect.clone());
        let result = self.respond(&effect);
        async move { result }
    }
}

pub fn repo() -> RepoId {
    RepoId::new("cilium", "cilium")
}

/// A newly created comment by `octocat` on PR #42.
pub fn comment_event(body: &str) -> IssueCommentEvent {
    IssueCommentEvent {
        repo: repo(),
        action: CommentAction::Created,
        pr_number: Some(PrNumber(42)),
        comment_id: CommentId(1001),
        body: body.to_string(),
        author_login: "octocat".to_string(),
    }
}

/// An open same-repository PR from `feature` into `main` at `abc123`.
pub fn open_pr(number: u64) -> PrData {
    PrData {
        number: PrNumber(number),
        head_sha: Sha::from("abc123"),
        head_ref: "feature".to_string(),
        head_repo: Some(repo()),
        base_ref: "main".to_string(),
    }
}

pub fn merge_group_event() -> MergeGroupEvent {
    MergeGroupEvent {
        repo: repo(),
        action: MergeGroupAction::ChecksRequested,
        head_sha: Sha::from("def456"),
        base_ref: "refs/heads/main".to_string(),
    }
}
