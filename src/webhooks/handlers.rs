//! Event handlers for GitHub webhook events.
//!
//! Handlers turn a parsed event into GitHub effects, executed one at a time
//! through a [`GitHubInterpreter`]. The decision logic itself lives in
//! [`crate::decision`]; handlers gather its inputs and act on its answers.
//!
//! # Event Types
//!
//! | Event | Handler |
//! |-------|---------|
//! | `issue_comment` | `handle_issue_comment` - trigger phrases on PRs |
//! | `merge_group` | `handle_merge_group` - app-agnostic required checks |

mod issue_comment;
mod merge_group;

use std::fmt;

use thiserror::Error;

use crate::config::{ConfigError, ConfigLoader};
use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse};
use crate::types::{PrNumber, WorkflowId};
use crate::webhooks::GitHubEvent;
use crate::webhooks::events::{CommentAction, MergeGroupAction};

pub use issue_comment::{handle_issue_comment, rerun_failed_jobs};
pub use merge_group::handle_merge_group;

/// Errors that can occur during event handling.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The comment's PR is not among the repository's open PRs.
    #[error("PR {0} not found among open pull requests")]
    PrNotFound(PrNumber),

    /// The repository configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A GitHub API call failed.
    #[error("GitHub API call failed: {0}")]
    GitHub(String),

    /// The interpreter answered an effect with the wrong response variant.
    #[error("unexpected response to {effect}: {response}")]
    UnexpectedResponse {
        effect: &'static str,
        response: String,
    },

    /// Workflow inputs could not be encoded.
    #[error("failed to encode workflow inputs: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Why an event needed no action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The comment is on an issue, not a pull request.
    NotAPullRequest,
    /// Only newly created comments can trigger workflows.
    CommentNotCreated(CommentAction),
    /// A bot that doesn't belong to the repository owner wrote the comment.
    ForeignBot(String),
    /// The author is not an active member of any allowed team.
    NotAllowed(String),
    /// The comment matches no trigger phrase.
    NoTrigger,
    /// Merge group actions other than `checks_requested`.
    MergeGroupAction(MergeGroupAction),
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::NotAPullRequest => write!(f, "comment is not on a pull request"),
            IgnoreReason::CommentNotCreated(action) => write!(f, "comment action is {:?}", action),
            IgnoreReason::ForeignBot(login) => write!(f, "unsupported bot author {}", login),
            IgnoreReason::NotAllowed(login) => {
                write!(f, "{} is not an active member of an allowed team", login)
            }
            IgnoreReason::NoTrigger => write!(f, "comment matches no trigger"),
            IgnoreReason::MergeGroupAction(action) => {
                write!(f, "merge group action is {:?}", action)
            }
        }
    }
}

/// What a handler did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// Nothing to do.
    Ignored(IgnoreReason),

    /// A trigger phrase was acted on. Each triggered workflow lands in
    /// exactly one list, in trigger order.
    Processed {
        /// Workflows a `workflow_dispatch` was created for.
        dispatched: Vec<WorkflowId>,
        /// Irrelevant workflows reported as a skipped check run.
        skipped: Vec<WorkflowId>,
        /// Workflows whose last run on the head commit already passed.
        reused: Vec<WorkflowId>,
    },

    /// A merge group's app-agnostic required checks were reported.
    ChecksReported {
        /// Check contexts a success check run was created for.
        passed: Vec<String>,
        /// Check contexts whose check run could not be created.
        failed: Vec<String>,
    },
}

/// Handles a GitHub webhook event.
///
/// `github` must be scoped to the event's repository.
pub async fn handle_event<G, L>(
    event: &GitHubEvent,
    github: &G,
    loader: &L,
) -> Result<HandlerOutcome, HandlerError>
where
    G: GitHubInterpreter + Sync,
    G::Error: fmt::Display,
    L: ConfigLoader + Sync,
{
    match event {
        GitHubEvent::IssueComment(e) => handle_issue_comment(e, github, loader).await,
        GitHubEvent::MergeGroup(e) => handle_merge_group(e, github).await,
    }
}

/// Executes one effect, mapping interpreter errors into [`HandlerError::GitHub`].
async fn execute<G>(github: &G, effect: GitHubEffect) -> Result<GitHubResponse, HandlerError>
where
    G: GitHubInterpreter + Sync,
    G::Error: fmt::Display,
{
    github
        .interpret(effect)
        .await
        .map_err(|e| HandlerError::GitHub(e.to_string()))
}

fn unexpected(effect: &'static str, response: GitHubResponse) -> HandlerError {
    HandlerError::UnexpectedResponse {
        effect,
        response: format!("{:?}", response),
    }
}
