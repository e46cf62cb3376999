//! Handler for `merge_group` webhook events.
//!
//! Workflows started by trigger phrases never run on merge queue branches, so
//! a required check they would normally satisfy is reported as passed
//! directly. Only checks that accept any source (no app, or app id 0) are
//! reported: a check bound to a specific app must come from that app.

use std::fmt;

use tracing::{debug, info, instrument, warn};

use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse};
use crate::types::{RunConclusion, RunStatus};
use crate::webhooks::events::{MergeGroupAction, MergeGroupEvent};

use super::{HandlerError, HandlerOutcome, IgnoreReason, execute, unexpected};

/// Handles a merge group event.
#[instrument(skip_all, fields(repo = %event.repo, sha = event.head_sha.short()))]
pub async fn handle_merge_group<G>(
    event: &MergeGroupEvent,
    github: &G,
) -> Result<HandlerOutcome, HandlerError>
where
    G: GitHubInterpreter + Sync,
    G::Error: fmt::Display,
{
    if event.action != MergeGroupAction::ChecksRequested {
        debug!(action = ?event.action, "ignoring merge group action");
        return Ok(HandlerOutcome::Ignored(IgnoreReason::MergeGroupAction(
            event.action,
        )));
    }

    let branch = event.base_branch();
    let checks = match execute(
        github,
        GitHubEffect::GetRequiredChecks {
            branch: branch.to_string(),
        },
    )
    .await?
    {
        GitHubResponse::RequiredChecks(checks) => checks,
        other => return Err(unexpected("get_required_checks", other)),
    };
    debug!(branch, count = checks.len(), "fetched required checks");

    let mut passed = Vec::new();
    let mut failed = Vec::new();

    for check in checks.into_iter().filter(|c| c.is_app_agnostic()) {
        let effect = GitHubEffect::CreateCheckRun {
            name: check.context.clone(),
            head_sha: event.head_sha.clone(),
            status: RunStatus::Completed,
            conclusion: RunConclusion::Success,
        };
        match github.interpret(effect).await {
            Ok(GitHubResponse::CheckRunCreated { id }) => {
                debug!(context = %check.context, check_run = id, "reported required check");
                passed.push(check.context);
            }
            Ok(other) => {
                warn!(context = %check.context, response = ?other, "unexpected check run response");
                failed.push(check.context);
            }
            Err(e) => {
                warn!(context = %check.context, error = %e, "failed to create check run");
                failed.push(check.context);
            }
        }
    }

    info!(
        passed = passed.len(),
        failed = failed.len(),
        "reported required checks for merge group"
    );
    Ok(HandlerOutcome::ChecksReported { passed, failed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::RequiredCheck;
    use crate::test_utils::{MockGitHub, merge_group_event};

    fn check(context: &str, app_id: Option<u64>) -> RequiredCheck {
        RequiredCheck {
            context: context.to_string(),
            app_id,
        }
    }

    fn check_runs(github: &MockGitHub) -> Vec<GitHubEffect> {
        github
            .recorded()
            .into_iter()
            .filter(|e| matches!(e, GitHubEffect::CreateCheckRun { .. }))
            .collect()
    }

    #[tokio::test]
    async fn app_agnostic_check_is_reported_as_success() {
        let github = MockGitHub::new().with_required_checks(vec![check("ci/lint", Some(0))]);
        let event = merge_group_event();

        let outcome = handle_merge_group(&event, &github).await.unwrap();

        assert_eq!(
            outcome,
            HandlerOutcome::ChecksReported {
                passed: vec!["ci/lint".to_string()],
                failed: vec![],
            }
        );
        assert_eq!(
            check_runs(&github),
            vec![GitHubEffect::CreateCheckRun {
                name: "ci/lint".to_string(),
                head_sha: event.head_sha.clone(),
                status: RunStatus::Completed,
                conclusion: RunConclusion::Success,
            }]
        );
    }

    #[tokio::test]
    async fn app_bound_check_is_left_alone() {
        let github = MockGitHub::new().with_required_checks(vec![check("Travis CI", Some(15368))]);

        let outcome = handle_merge_group(&merge_group_event(), &github).await.unwrap();

        assert_eq!(
            outcome,
            HandlerOutcome::ChecksReported {
                passed: vec![],
                failed: vec![],
            }
        );
        assert!(check_runs(&github).is_empty());
    }

    #[tokio::test]
    async fn checks_are_read_from_base_branch() {
        let github = MockGitHub::new().with_required_checks(vec![check("build", None)]);

        handle_merge_group(&merge_group_event(), &github).await.unwrap();

        assert_eq!(
            github.recorded().first(),
            Some(&GitHubEffect::GetRequiredChecks {
                branch: "main".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn check_run_failure_is_collected() {
        let github = MockGitHub::new()
            .with_required_checks(vec![check("build", None), check("lint", Some(0))])
            .failing_on("create_check_run");

        let outcome = handle_merge_group(&merge_group_event(), &github).await.unwrap();

        assert_eq!(
            outcome,
            HandlerOutcome::ChecksReported {
                passed: vec![],
                failed: vec!["build".to_string(), "lint".to_string()],
            }
        );
    }

    #[tokio::test]
    async fn protection_lookup_failure_is_an_error() {
        let github = MockGitHub::new().failing_on("get_required_checks");

        let result = handle_merge_group(&merge_group_event(), &github).await;

        assert!(matches!(result, Err(HandlerError::GitHub(_))));
        assert!(check_runs(&github).is_empty());
    }

    #[tokio::test]
    async fn destroyed_group_is_ignored() {
        let github = MockGitHub::new();
        let mut event = merge_group_event();
        event.action = MergeGroupAction::Destroyed;

        let outcome = handle_merge_group(&event, &github).await.unwrap();

        assert_eq!(
            outcome,
            HandlerOutcome::Ignored(IgnoreReason::MergeGroupAction(MergeGroupAction::Destroyed))
        );
        assert!(github.recorded().is_empty());
    }
}
