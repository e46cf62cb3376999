//! GitHub webhook event types.
//!
//! Typed representations of the two webhook events the bot acts on:
//!
//! - `issue_comment`: a comment on a PR conversation, possibly a trigger phrase
//! - `merge_group`: the merge queue asking for checks on a temporary branch

use serde::{Deserialize, Serialize};

use crate::types::{CommentId, PrNumber, RepoId, Sha};

/// A parsed GitHub webhook event.
///
/// Unknown or irrelevant events are represented by returning `None` from the
/// parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GitHubEvent {
    /// An issue or PR comment was created, edited, or deleted.
    ///
    /// Note: In GitHub's API, PR comments on the conversation tab are delivered
    /// as `issue_comment` events, not `pull_request_review_comment` events.
    IssueComment(IssueCommentEvent),

    /// The merge queue created or destroyed a merge group.
    MergeGroup(MergeGroupEvent),
}

impl GitHubEvent {
    /// Returns the repository this event belongs to.
    pub fn repo_id(&self) -> &RepoId {
        match self {
            GitHubEvent::IssueComment(e) => &e.repo,
            GitHubEvent::MergeGroup(e) => &e.repo,
        }
    }

    /// The `X-GitHub-Event` name this event was parsed from.
    pub fn event_type(&self) -> &'static str {
        match self {
            GitHubEvent::IssueComment(_) => "issue_comment",
            GitHubEvent::MergeGroup(_) => "merge_group",
        }
    }
}

/// Action performed on an issue comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentAction {
    Created,
    Edited,
    Deleted,
}

/// An issue/PR comment event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCommentEvent {
    /// The repository.
    pub repo: RepoId,

    /// The action that triggered this event.
    pub action: CommentAction,

    /// The PR number (issue number for PRs).
    ///
    /// `None` when the comment is on a plain issue.
    pub pr_number: Option<PrNumber>,

    pub comment_id: CommentId,

    /// The comment body text. Empty for `deleted` actions.
    pub body: String,

    /// The comment author's login name.
    pub author_login: String,
}

impl IssueCommentEvent {
    /// Whether the author is a GitHub App or bot account.
    pub fn is_bot_author(&self) -> bool {
        self.author_login.ends_with("[bot]")
    }
}

/// Action performed on a merge group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeGroupAction {
    /// The merge queue needs required checks to report on the group's head.
    ChecksRequested,
    /// The group was merged or removed from the queue.
    Destroyed,
}

/// A merge queue event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeGroupEvent {
    pub repo: RepoId,

    pub action: MergeGroupAction,

    /// The merge group's temporary head commit.
    pub head_sha: Sha,

    /// Full ref of the target branch, e.g. `refs/heads/main`.
    pub base_ref: String,
}

impl MergeGroupEvent {
    /// The target branch name, without the `refs/heads/` prefix.
    pub fn base_branch(&self) -> &str {
        self.base_ref
            .strip_prefix("refs/heads/")
            .unwrap_or(&self.base_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment_by(login: &str) -> IssueCommentEvent {
        IssueCommentEvent {
            repo: RepoId::new("cilium", "cilium"),
            action: CommentAction::Created,
            pr_number: Some(PrNumber(1)),
            comment_id: CommentId(1),
            body: "/test".to_string(),
            author_login: login.to_string(),
        }
    }

    #[test]
    fn bot_author_detection() {
        assert!(comment_by("cilium-ci[bot]").is_bot_author());
        assert!(comment_by("dependabot[bot]").is_bot_author());
        assert!(!comment_by("octocat").is_bot_author());
        assert!(!comment_by("[bot]octocat").is_bot_author());
    }

    #[test]
    fn base_branch_strips_heads_prefix() {
        let mut event = MergeGroupEvent {
            repo: RepoId::new("cilium", "cilium"),
            action: MergeGroupAction::ChecksRequested,
            head_sha: Sha::from("abc"),
            base_ref: "refs/heads/main".to_string(),
        };
        assert_eq!(event.base_branch(), "main");

        event.base_ref = "refs/heads/release/v1.16".to_string();
        assert_eq!(event.base_branch(), "release/v1.16");

        event.base_ref = "main".to_string();
        assert_eq!(event.base_branch(), "main");
    }
}
