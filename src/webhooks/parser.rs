//! GitHub webhook payload parser.
//!
//! Parses raw webhook JSON payloads into typed [`GitHubEvent`] values.
//!
//! # Parsing Strategy
//!
//! 1. The event type is determined from the `X-GitHub-Event` header
//! 2. The payload is parsed according to the event type
//! 3. Unknown event types return `Ok(None)` (ignored, not error)
//! 4. Malformed payloads return `Err` with details

use serde::Deserialize;
use thiserror::Error;

use crate::types::{CommentId, PrNumber, RepoId, Sha};

use super::events::{
    CommentAction, GitHubEvent, IssueCommentEvent, MergeGroupAction, MergeGroupEvent,
};

/// Error type for webhook parsing failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON deserialization failed (includes missing required fields).
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Field has an invalid value (e.g. an empty head SHA).
    #[error("invalid field value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// Parses a webhook payload into a typed event.
///
/// * `Ok(Some(event))` - Successfully parsed a known event type
/// * `Ok(None)` - Unknown event type or irrelevant action (ignored, not an error)
/// * `Err(e)` - Malformed payload or missing required fields
///
/// # Examples
///
/// ```
/// use ariane::webhooks::parse_webhook;
///
/// let payload = br#"{
///     "action": "created",
///     "comment": {
///         "id": 123,
///         "body": "/test",
///         "user": { "login": "octocat" }
///     },
///     "issue": {
///         "number": 42,
///         "pull_request": { "url": "..." }
///     },
///     "repository": {
///         "owner": { "login": "owner" },
///         "name": "repo"
///     }
/// }"#;
///
/// let result = parse_webhook("issue_comment", payload);
/// assert!(matches!(result, Ok(Some(_))));
/// ```
pub fn parse_webhook(event_type: &str, payload: &[u8]) -> Result<Option<GitHubEvent>, ParseError> {
    match event_type {
        "issue_comment" => parse_issue_comment(payload).map(|opt| opt.map(GitHubEvent::IssueComment)),
        "merge_group" => parse_merge_group(payload).map(|opt| opt.map(GitHubEvent::MergeGroup)),
        // Unknown event types are ignored (not an error)
        _ => Ok(None),
    }
}

// ============================================================================
// Raw payload structures for deserialization
//
// These match GitHub's webhook JSON structure. Unknown fields are ignored.
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawRepository {
    owner: RawOwner,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawOwner {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    login: String,
}

impl RawRepository {
    fn into_repo_id(self) -> RepoId {
        RepoId::new(self.owner.login, self.name)
    }
}

// ============================================================================
// issue_comment event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawIssueCommentPayload {
    action: String,
    comment: RawComment,
    issue: RawIssue,
    repository: RawRepository,
}

#[derive(Debug, Deserialize)]
struct RawComment {
    id: u64,
    body: Option<String>,
    user: RawUser,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    number: u64,
    // If this field is present, the issue is actually a PR
    pull_request: Option<serde_json::Value>,
}

fn parse_issue_comment(payload: &[u8]) -> Result<Option<IssueCommentEvent>, ParseError> {
    let raw: RawIssueCommentPayload = serde_json::from_slice(payload)?;

    let action = match raw.action.as_str() {
        "created" => CommentAction::Created,
        "edited" => CommentAction::Edited,
        "deleted" => CommentAction::Deleted,
        // `pinned`, `unpinned` and anything newer never trigger workflows
        _ => return Ok(None),
    };

    let pr_number = raw.issue.pull_request.map(|_| PrNumber(raw.issue.number));

    Ok(Some(IssueCommentEvent {
        repo: raw.repository.into_repo_id(),
        action,
        pr_number,
        comment_id: CommentId(raw.comment.id),
        body: raw.comment.body.unwrap_or_default(),
        author_login: raw.comment.user.login,
    }))
}

// ============================================================================
// merge_group event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawMergeGroupPayload {
    action: String,
    merge_group: RawMergeGroup,
    repository: RawRepository,
}

#[derive(Debug, Deserialize)]
struct RawMergeGroup {
    head_sha: String,
    base_ref: String,
}

fn parse_merge_group(payload: &[u8]) -> Result<Option<MergeGroupEvent>, ParseError> {
    let raw: RawMergeGroupPayload = serde_json::from_slice(payload)?;

    let action = match raw.action.as_str() {
        "checks_requested" => MergeGroupAction::ChecksRequested,
        "destroyed" => MergeGroupAction::Destroyed,
        // Actions GitHub may add later are not relevant to us
        _ => return Ok(None),
    };

    if raw.merge_group.head_sha.is_empty() {
        return Err(ParseError::InvalidField {
            field: "merge_group.head_sha",
            value: raw.merge_group.head_sha,
        });
    }

    Ok(Some(MergeGroupEvent {
        repo: raw.repository.into_repo_id(),
        action,
        head_sha: Sha::new(raw.merge_group.head_sha),
        base_ref: raw.merge_group.base_ref,
    }))
}
