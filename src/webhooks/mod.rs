//! Webhook handling for GitHub events.
//!
//! This module provides:
//! - Typed `issue_comment` and `merge_group` events
//! - Payload parsing keyed by the `X-GitHub-Event` header
//! - The handlers that act on each event

pub mod events;
pub mod handlers;
pub mod parser;

pub use events::{
    CommentAction, GitHubEvent, IssueCommentEvent, MergeGroupAction, MergeGroupEvent,
};
pub use handlers::{
    HandlerError, HandlerOutcome, IgnoreReason, handle_event, handle_issue_comment,
    handle_merge_group, rerun_failed_jobs,
};
pub use parser::{ParseError, parse_webhook};
