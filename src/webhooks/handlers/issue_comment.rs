//! Handler for `issue_comment` webhook events.
//!
//! A newly created PR comment that matches a configured trigger phrase starts
//! the trigger's workflows. For each workflow, in order:
//!
//! 1. the last run on the PR head already passed: leave it alone
//! 2. the changed files are relevant: create a `workflow_dispatch` event
//! 3. otherwise: report a skipped check run under the workflow's name
//!
//! The comment then gets a rocket reaction.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, instrument, warn};

use crate::config::ConfigLoader;
use crate::decision::{TriggerMatch, is_relevant, match_trigger, should_skip};
use crate::effects::{
    DispatchInputs, GitHubEffect, GitHubInterpreter, GitHubResponse, PrData, Reaction,
};
use crate::types::{
    ChangedFile, PrNumber, RunConclusion, RunStatus, Sha, WorkflowId, WorkflowRunState,
};
use crate::webhooks::events::{CommentAction, IssueCommentEvent};

use super::{HandlerError, HandlerOutcome, IgnoreReason, execute, unexpected};

/// Job that reports the aggregate commit status for a run; it has to be
/// re-run before the failed jobs so the status is reset.
const COMMIT_STATUS_START_JOB: &str = "Commit Status Start";

/// Handles an issue comment event.
///
/// `github` must be scoped to `event.repo`.
#[instrument(skip_all, fields(repo = %event.repo, comment = %event.comment_id))]
pub async fn handle_issue_comment<G, L>(
    event: &IssueCommentEvent,
    github: &G,
    loader: &L,
) -> Result<HandlerOutcome, HandlerError>
where
    G: GitHubInterpreter + Sync,
    G::Error: fmt::Display,
    L: ConfigLoader + Sync,
{
    let Some(pr_number) = event.pr_number else {
        debug!("comment is not on a pull request");
        return Ok(HandlerOutcome::Ignored(IgnoreReason::NotAPullRequest));
    };

    if event.action != CommentAction::Created {
        debug!(action = ?event.action, "ignoring comment action");
        return Ok(HandlerOutcome::Ignored(IgnoreReason::CommentNotCreated(
            event.action,
        )));
    }

    // Bots owned by the repository owner (e.g. `cilium-ci[bot]`) may trigger
    // workflows and bypass the team allowlist; other bots are ignored.
    let is_bot = event.is_bot_author();
    if is_bot && !event.author_login.starts_with(&event.repo.owner) {
        debug!(author = %event.author_login, "comment by unsupported bot");
        return Ok(HandlerOutcome::Ignored(IgnoreReason::ForeignBot(
            event.author_login.clone(),
        )));
    }

    let pr = find_open_pr(github, pr_number).await?;

    // Fork branches are not reachable for workflow_dispatch; run from the base
    // branch instead and let the workflow check out the SHA.
    let context_ref = if pr.is_from_fork(&event.repo) {
        pr.base_ref.clone()
    } else {
        pr.head_ref.clone()
    };
    let head_sha = pr.head_sha.clone();
    debug!(pr = %pr_number, context_ref = %context_ref, sha = head_sha.short(), "resolved PR context");

    let config = loader.load(github, &context_ref).await?;

    if !is_bot && !is_allowed(github, &config.allowed_teams, &event.author_login).await {
        info!(author = %event.author_login, "comment author is not in an allowed team");
        return Ok(HandlerOutcome::Ignored(IgnoreReason::NotAllowed(
            event.author_login.clone(),
        )));
    }

    let Some(trigger) = match_trigger(&config.triggers, &event.body) else {
        debug!("comment matches no trigger");
        return Ok(HandlerOutcome::Ignored(IgnoreReason::NoTrigger));
    };
    debug!(groups = ?trigger.captured_groups, "found trigger phrase");

    let inputs = dispatch_inputs(pr_number, &context_ref, &head_sha, &trigger)?;
    let files = list_changed_files(github, pr_number).await?;

    let mut dispatched = Vec::new();
    let mut skipped = Vec::new();
    let mut reused = Vec::new();

    for workflow in &trigger.workflows {
        let last_run = latest_run(github, workflow, &head_sha).await;
        if should_skip(last_run.as_ref()) {
            info!(%workflow, sha = head_sha.short(), "workflow already passed on this commit");
            reused.push(workflow.clone());
            continue;
        }

        if is_relevant(&config, workflow, &files) {
            dispatch(github, workflow, &context_ref, &inputs).await?;
            info!(%workflow, context_ref = %context_ref, "dispatched workflow");
            dispatched.push(workflow.clone());
        } else {
            mark_skipped(github, workflow, &head_sha).await?;
            info!(%workflow, "workflow not relevant to changes, marked as skipped");
            skipped.push(workflow.clone());
        }
    }

    match execute(
        github,
        GitHubEffect::AddReaction {
            comment_id: event.comment_id,
            reaction: Reaction::Rocket,
        },
    )
    .await?
    {
        GitHubResponse::ReactionAdded => {}
        other => return Err(unexpected("add_reaction", other)),
    }

    Ok(HandlerOutcome::Processed {
        dispatched,
        skipped,
        reused,
    })
}

async fn find_open_pr<G>(github: &G, pr_number: PrNumber) -> Result<PrData, HandlerError>
where
    G: GitHubInterpreter + Sync,
    G::Error: fmt::Display,
{
    match execute(github, GitHubEffect::ListOpenPrs).await? {
        GitHubResponse::PrList(prs) => prs
            .into_iter()
            .find(|pr| pr.number == pr_number)
            .ok_or(HandlerError::PrNotFound(pr_number)),
        other => Err(unexpected("list_open_prs", other)),
    }
}

/// An empty allowlist admits everyone. Otherwise the author must be an active
/// member of at least one listed team; a lookup error denies.
async fn is_allowed<G>(github: &G, teams: &[String], author: &str) -> bool
where
    G: GitHubInterpreter + Sync,
    G::Error: fmt::Display,
{
    if teams.is_empty() {
        return true;
    }

    for team in teams {
        let effect = GitHubEffect::GetTeamMembership {
            team: team.clone(),
            user: author.to_string(),
        };
        match github.interpret(effect).await {
            Ok(GitHubResponse::TeamMembership(Some(state))) if state == "active" => return true,
            Ok(GitHubResponse::TeamMembership(_)) => {
                debug!(author, team = %team, "not an active member of team");
            }
            Ok(other) => {
                warn!(author, team = %team, response = ?other, "unexpected team membership response");
                return false;
            }
            Err(e) => {
                warn!(author, team = %team, error = %e, "failed to look up team membership");
                return false;
            }
        }
    }
    false
}

fn dispatch_inputs(
    pr_number: PrNumber,
    context_ref: &str,
    head_sha: &Sha,
    trigger: &TriggerMatch,
) -> Result<DispatchInputs, HandlerError> {
    let mut inputs = DispatchInputs::new();
    inputs.insert("PR-number".to_string(), pr_number.0.to_string());
    inputs.insert("context-ref".to_string(), context_ref.to_string());
    inputs.insert("SHA".to_string(), head_sha.to_string());
    if let Some(extra) = trigger.extra_args() {
        inputs.insert("extra-args".to_string(), serde_json::to_string(extra)?);
    }
    Ok(inputs)
}

async fn list_changed_files<G>(github: &G, pr_number: PrNumber) -> Result<Vec<ChangedFile>, HandlerError>
where
    G: GitHubInterpreter + Sync,
    G::Error: fmt::Display,
{
    match execute(github, GitHubEffect::ListPrFiles { pr: pr_number }).await? {
        GitHubResponse::Files(files) => Ok(files),
        other => Err(unexpected("list_pr_files", other)),
    }
}

/// The most recent run of `workflow` on `head_sha`. Lookup failures count as
/// "no run" so the workflow is still considered.
async fn latest_run<G>(github: &G, workflow: &WorkflowId, head_sha: &Sha) -> Option<WorkflowRunState>
where
    G: GitHubInterpreter + Sync,
    G::Error: fmt::Display,
{
    let effect = GitHubEffect::ListWorkflowRuns {
        workflow: workflow.clone(),
        head_sha: head_sha.clone(),
    };
    match github.interpret(effect).await {
        Ok(GitHubResponse::WorkflowRuns(runs)) => runs.into_iter().next(),
        Ok(other) => {
            warn!(%workflow, response = ?other, "unexpected workflow runs response");
            None
        }
        Err(e) => {
            warn!(%workflow, error = %e, "failed to list workflow runs");
            None
        }
    }
}

async fn dispatch<G>(
    github: &G,
    workflow: &WorkflowId,
    context_ref: &str,
    inputs: &DispatchInputs,
) -> Result<(), HandlerError>
where
    G: GitHubInterpreter + Sync,
    G::Error: fmt::Display,
{
    let effect = GitHubEffect::DispatchWorkflow {
        workflow: workflow.clone(),
        git_ref: context_ref.to_string(),
        inputs: inputs.clone(),
    };
    match execute(github, effect).await? {
        GitHubResponse::WorkflowDispatched => Ok(()),
        other => Err(unexpected("dispatch_workflow", other)),
    }
}

/// Creates a completed, skipped check run named after the workflow, so
/// required checks with that name don't block the PR.
async fn mark_skipped<G>(github: &G, workflow: &WorkflowId, head_sha: &Sha) -> Result<(), HandlerError>
where
    G: GitHubInterpreter + Sync,
    G::Error: fmt::Display,
{
    let name = match execute(
        github,
        GitHubEffect::GetWorkflow {
            workflow: workflow.clone(),
        },
    )
    .await?
    {
        GitHubResponse::Workflow(data) => data.name,
        other => return Err(unexpected("get_workflow", other)),
    };

    let effect = GitHubEffect::CreateCheckRun {
        name,
        head_sha: head_sha.clone(),
        status: RunStatus::Completed,
        conclusion: RunConclusion::Skipped,
    };
    match execute(github, effect).await? {
        GitHubResponse::CheckRunCreated { .. } => Ok(()),
        other => Err(unexpected("create_check_run", other)),
    }
}

/// Re-runs the failed jobs of a workflow run in the background.
///
/// If the run has a `Commit Status Start` job, that job is re-run first and
/// the task waits `run_delay` before re-running the failed jobs. The whole
/// sequence is bounded by `run_delay + 5s`. Failures are logged only.
///
/// Not called from the comment flow, which dispatches failed workflows again.
pub fn rerun_failed_jobs<G>(
    tracker: &TaskTracker,
    github: Arc<G>,
    workflow: WorkflowId,
    run_id: u64,
    run_delay: Duration,
) -> JoinHandle<()>
where
    G: GitHubInterpreter + Send + Sync + 'static,
    G::Error: fmt::Display,
{
    tracker.spawn(async move {
        let deadline = run_delay + Duration::from_secs(5);
        match tokio::time::timeout(deadline, rerun_sequence(&*github, run_id, run_delay)).await {
            Ok(Ok(())) => info!(%workflow, run_id, "re-ran failed jobs"),
            Ok(Err(e)) => warn!(%workflow, run_id, error = %e, "failed to re-run failed jobs"),
            Err(_) => warn!(%workflow, run_id, ?deadline, "re-running failed jobs timed out"),
        }
    })
}

async fn rerun_sequence<G>(github: &G, run_id: u64, run_delay: Duration) -> Result<(), HandlerError>
where
    G: GitHubInterpreter + Sync,
    G::Error: fmt::Display,
{
    let jobs = match execute(github, GitHubEffect::ListWorkflowJobs { run_id }).await? {
        GitHubResponse::WorkflowJobs(jobs) => jobs,
        other => return Err(unexpected("list_workflow_jobs", other)),
    };

    if let Some(job) = jobs.iter().find(|j| j.name == COMMIT_STATUS_START_JOB) {
        debug!(job_id = job.id, "re-running commit status job");
        execute(github, GitHubEffect::RerunJob { job_id: job.id }).await?;
        tokio::time::sleep(run_delay).await;
    }

    execute(github, GitHubEffect::RerunFailedJobs { run_id }).await?;
    Ok(())
}
