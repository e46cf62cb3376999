//! GitHub effect interpreter using octocrab.
//!
//! Pull request listing, file contents and workflow dispatch go through
//! octocrab's typed API. The Actions, Checks and Teams endpoints are called
//! through the raw REST helpers and decoded into the private structs below.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::effects::{
    DispatchInputs, GitHubEffect, GitHubInterpreter, GitHubResponse, JobData, PrData, Reaction,
    RequiredCheck, WorkflowData,
};
use crate::types::{
    ChangedFile, CommentId, PrNumber, RepoId, RunConclusion, RunStatus, Sha, WorkflowId,
    WorkflowRunState,
};

use super::client::OctocrabClient;
use super::error::GitHubApiError;

/// GitHub's maximum page size for list endpoints.
const PAGE_SIZE: usize = 100;

impl GitHubInterpreter for OctocrabClient {
    type Error = GitHubApiError;

    async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, Self::Error> {
        interpret_github_effect(self, effect).await
    }
}

/// Executes a single effect against the GitHub API.
pub async fn interpret_github_effect(
    client: &OctocrabClient,
    effect: GitHubEffect,
) -> Result<GitHubResponse, GitHubApiError> {
    debug!(repo = %client.repo(), effect = effect.name(), "executing GitHub effect");

    match effect {
        GitHubEffect::ListOpenPrs => list_open_prs(client).await,
        GitHubEffect::ListPrFiles { pr } => list_pr_files(client, pr).await,
        GitHubEffect::GetFileContents { path, git_ref } => {
            get_file_contents(client, &path, &git_ref).await
        }
        GitHubEffect::GetTeamMembership { team, user } => {
            get_team_membership(client, &team, &user).await
        }
        GitHubEffect::ListWorkflowRuns { workflow, head_sha } => {
            list_workflow_runs(client, &workflow, &head_sha).await
        }
        GitHubEffect::GetWorkflow { workflow } => get_workflow(client, &workflow).await,
        GitHubEffect::DispatchWorkflow {
            workflow,
            git_ref,
            inputs,
        } => dispatch_workflow(client, &workflow, git_ref, inputs).await,
        GitHubEffect::ListWorkflowJobs { run_id } => list_workflow_jobs(client, run_id).await,
        GitHubEffect::RerunJob { job_id } => rerun_job(client, job_id).await,
        GitHubEffect::RerunFailedJobs { run_id } => rerun_failed_jobs(client, run_id).await,
        GitHubEffect::CreateCheckRun {
            name,
            head_sha,
            status,
            conclusion,
        } => create_check_run(client, name, head_sha, status, conclusion).await,
        GitHubEffect::GetRequiredChecks { branch } => get_required_checks(client, &branch).await,
        GitHubEffect::AddReaction {
            comment_id,
            reaction,
        } => add_reaction(client, comment_id, reaction).await,
    }
}

fn repo_url(client: &OctocrabClient, rest: &str) -> String {
    format!("/repos/{}/{}/{}", client.owner(), client.repo_name(), rest)
}

// ─── Pull requests ────────────────────────────────────────────────────────────

async fn list_open_prs(client: &OctocrabClient) -> Result<GitHubResponse, GitHubApiError> {
    let mut page = 1u32;
    let mut all_prs = Vec::new();

    loop {
        let result = client
            .inner()
            .pulls(client.owner(), client.repo_name())
            .list()
            .state(octocrab::params::State::Open)
            .per_page(PAGE_SIZE as u8)
            .page(page)
            .send()
            .await;

        match result {
            Ok(page_result) => {
                let items = page_result.items;
                let is_last_page = items.len() < PAGE_SIZE;

                for pull in items {
                    let head_repo = pull.head.repo.as_ref().and_then(|repo| {
                        repo.owner
                            .as_ref()
                            .map(|owner| RepoId::new(owner.login.clone(), repo.name.clone()))
                    });

                    all_prs.push(PrData {
                        number: PrNumber(pull.number),
                        head_sha: Sha::new(pull.head.sha.clone()),
                        head_ref: pull.head.ref_field.clone(),
                        head_repo,
                        base_ref: pull.base.ref_field.clone(),
                    });
                }

                if is_last_page {
                    break;
                }
                page += 1;
            }
            Err(e) => return Err(GitHubApiError::from_octocrab(e)),
        }
    }

    Ok(GitHubResponse::PrList(all_prs))
}

#[derive(Debug, Deserialize)]
struct FileEntry {
    filename: String,
}

async fn list_pr_files(
    client: &OctocrabClient,
    pr: PrNumber,
) -> Result<GitHubResponse, GitHubApiError> {
    let mut page = 1u32;
    let mut files = Vec::new();

    loop {
        let url = repo_url(
            client,
            &format!("pulls/{}/files?per_page={}&page={}", pr.0, PAGE_SIZE, page),
        );
        let result: Result<Vec<FileEntry>, _> = client.inner().get(&url, None::<&()>).await;

        match result {
            Ok(items) => {
                let is_last_page = items.len() < PAGE_SIZE;
                files.extend(items.into_iter().map(|f| ChangedFile::new(f.filename)));
                if is_last_page {
                    break;
                }
                page += 1;
            }
            Err(e) => return Err(GitHubApiError::from_octocrab(e)),
        }
    }

    Ok(GitHubResponse::Files(files))
}

// ─── Repository content ───────────────────────────────────────────────────────

async fn get_file_contents(
    client: &OctocrabClient,
    path: &str,
    git_ref: &str,
) -> Result<GitHubResponse, GitHubApiError> {
    let result = client
        .inner()
        .repos(client.owner(), client.repo_name())
        .get_content()
        .path(path)
        .r#ref(git_ref)
        .send()
        .await;

    match result {
        Ok(contents) => {
            let item = contents.items.into_iter().next().ok_or_else(|| {
                GitHubApiError::without_source(format!("{} is a directory or empty", path))
            })?;
            let text = item.decoded_content().ok_or_else(|| {
                GitHubApiError::without_source(format!("{} has no decodable content", path))
            })?;
            Ok(GitHubResponse::FileContents(Some(text)))
        }
        Err(e) => {
            let err = GitHubApiError::from_octocrab(e);
            if err.is_not_found() {
                Ok(GitHubResponse::FileContents(None))
            } else {
                Err(err)
            }
        }
    }
}

// ─── Organization ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct MembershipResponse {
    state: String,
}

async fn get_team_membership(
    client: &OctocrabClient,
    team: &str,
    user: &str,
) -> Result<GitHubResponse, GitHubApiError> {
    let url = format!(
        "/orgs/{}/teams/{}/memberships/{}",
        client.owner(),
        urlencoding::encode(team),
        urlencoding::encode(user)
    );

    let result: Result<MembershipResponse, _> = client.inner().get(&url, None::<&()>).await;

    match result {
        Ok(membership) => Ok(GitHubResponse::TeamMembership(Some(membership.state))),
        Err(e) => {
            let err = GitHubApiError::from_octocrab(e);
            if err.is_not_found() {
                Ok(GitHubResponse::TeamMembership(None))
            } else {
                Err(err)
            }
        }
    }
}

// ─── Actions ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct WorkflowRunsResponse {
    #[serde(default)]
    workflow_runs: Vec<RawWorkflowRun>,
}

#[derive(Debug, Deserialize)]
struct RawWorkflowRun {
    id: u64,
    status: Option<RunStatus>,
    conclusion: Option<RunConclusion>,
}

async fn list_workflow_runs(
    client: &OctocrabClient,
    workflow: &WorkflowId,
    head_sha: &Sha,
) -> Result<GitHubResponse, GitHubApiError> {
    // Runs come back newest first; only the latest one matters.
    let url = repo_url(
        client,
        &format!(
            "actions/workflows/{}/runs?head_sha={}&per_page=1",
            urlencoding::encode(workflow.as_str()),
            urlencoding::encode(head_sha.as_str())
        ),
    );

    let result: Result<WorkflowRunsResponse, _> = client.inner().get(&url, None::<&()>).await;

    match result {
        Ok(response) => Ok(GitHubResponse::WorkflowRuns(
            response
                .workflow_runs
                .into_iter()
                .map(|run| {
                    WorkflowRunState::new(
                        run.id,
                        run.status.unwrap_or(RunStatus::Other(String::new())),
                        run.conclusion,
                    )
                })
                .collect(),
        )),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

async fn get_workflow(
    client: &OctocrabClient,
    workflow: &WorkflowId,
) -> Result<GitHubResponse, GitHubApiError> {
    let url = repo_url(
        client,
        &format!("actions/workflows/{}", urlencoding::encode(workflow.as_str())),
    );

    let result: Result<WorkflowData, _> = client.inner().get(&url, None::<&()>).await;

    result
        .map(GitHubResponse::Workflow)
        .map_err(GitHubApiError::from_octocrab)
}

async fn dispatch_workflow(
    client: &OctocrabClient,
    workflow: &WorkflowId,
    git_ref: String,
    inputs: DispatchInputs,
) -> Result<GitHubResponse, GitHubApiError> {
    let inputs = serde_json::to_value(&inputs)
        .map_err(|e| GitHubApiError::without_source(format!("invalid dispatch inputs: {}", e)))?;

    // The endpoint answers 204 with no body, which the typed builder handles.
    let result = client
        .inner()
        .actions()
        .create_workflow_dispatch(client.owner(), client.repo_name(), workflow.as_str(), git_ref)
        .inputs(inputs)
        .send()
        .await;

    match result {
        Ok(()) => Ok(GitHubResponse::WorkflowDispatched),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

#[derive(Debug, Deserialize)]
struct JobsResponse {
    #[serde(default)]
    jobs: Vec<JobData>,
}

async fn list_workflow_jobs(
    client: &OctocrabClient,
    run_id: u64,
) -> Result<GitHubResponse, GitHubApiError> {
    let url = repo_url(client, &format!("actions/runs/{}/jobs?per_page=100", run_id));

    let result: Result<JobsResponse, _> = client.inner().get(&url, None::<&()>).await;

    result
        .map(|r| GitHubResponse::WorkflowJobs(r.jobs))
        .map_err(GitHubApiError::from_octocrab)
}

async fn rerun_job(client: &OctocrabClient, job_id: u64) -> Result<GitHubResponse, GitHubApiError> {
    let url = repo_url(client, &format!("actions/jobs/{}/rerun", job_id));
    post_without_body(client, url).await?;
    Ok(GitHubResponse::JobRerun)
}

async fn rerun_failed_jobs(
    client: &OctocrabClient,
    run_id: u64,
) -> Result<GitHubResponse, GitHubApiError> {
    let url = repo_url(client, &format!("actions/runs/{}/rerun-failed-jobs", run_id));
    post_without_body(client, url).await?;
    Ok(GitHubResponse::FailedJobsRerun)
}

/// POSTs to an endpoint that answers `201 Created` with an empty body, which
/// the typed `post` helper can't decode.
async fn post_without_body(client: &OctocrabClient, url: String) -> Result<(), GitHubApiError> {
    let response = client
        .inner()
        ._post(url, None::<&()>)
        .await
        .map_err(GitHubApiError::from_octocrab)?;
    octocrab::map_github_error(response)
        .await
        .map(drop)
        .map_err(GitHubApiError::from_octocrab)
}

// ─── Checks ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct CheckRunRequest<'a> {
    name: &'a str,
    head_sha: &'a str,
    status: &'a str,
    conclusion: &'a str,
}

#[derive(Debug, Deserialize)]
struct CheckRunResponse {
    id: u64,
}

async fn create_check_run(
    client: &OctocrabClient,
    name: String,
    head_sha: Sha,
    status: RunStatus,
    conclusion: RunConclusion,
) -> Result<GitHubResponse, GitHubApiError> {
    let url = repo_url(client, "check-runs");
    let request = CheckRunRequest {
        name: &name,
        head_sha: head_sha.as_str(),
        status: status.as_api_str(),
        conclusion: conclusion.as_api_str(),
    };

    let result: Result<CheckRunResponse, _> = client.inner().post(&url, Some(&request)).await;

    match result {
        Ok(check_run) => Ok(GitHubResponse::CheckRunCreated { id: check_run.id }),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

#[derive(Debug, Deserialize)]
struct BranchProtectionResponse {
    required_status_checks: Option<RequiredStatusChecks>,
}

#[derive(Debug, Deserialize)]
struct RequiredStatusChecks {
    #[serde(default)]
    checks: Vec<RequiredStatusCheck>,
}

#[derive(Debug, Deserialize)]
struct RequiredStatusCheck {
    context: String,
    #[serde(default)]
    app_id: Option<u64>,
}

async fn get_required_checks(
    client: &OctocrabClient,
    branch: &str,
) -> Result<GitHubResponse, GitHubApiError> {
    // Branch names may contain '/', e.g. "feature/foo" -> "feature%2Ffoo".
    let url = repo_url(
        client,
        &format!("branches/{}/protection", urlencoding::encode(branch)),
    );

    let result: Result<BranchProtectionResponse, _> = client.inner().get(&url, None::<&()>).await;

    match result {
        Ok(protection) => {
            let checks = protection
                .required_status_checks
                .map(|c| c.checks)
                .unwrap_or_default()
                .into_iter()
                .map(|c| RequiredCheck {
                    context: c.context,
                    app_id: c.app_id,
                })
                .collect::<Vec<_>>();
            if checks.is_empty() {
                warn!(branch, "branch protection lists no required checks");
            }
            Ok(GitHubResponse::RequiredChecks(checks))
        }
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

// ─── Comments ─────────────────────────────────────────────────────────────────

async fn add_reaction(
    client: &OctocrabClient,
    comment_id: CommentId,
    reaction: Reaction,
) -> Result<GitHubResponse, GitHubApiError> {
    let url = repo_url(client, &format!("issues/comments/{}/reactions", comment_id.0));

    #[derive(Serialize)]
    struct ReactionRequest {
        content: &'static str,
    }

    let result: Result<serde_json::Value, _> = client
        .inner()
        .post(
            &url,
            Some(&ReactionRequest {
                content: reaction.as_api_str(),
            }),
        )
        .await;

    match result {
        Ok(_) => Ok(GitHubResponse::ReactionAdded),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}
