//! GitHub API client and effect interpreter.
//!
//! Executes [`GitHubEffect`](crate::effects::GitHubEffect)s through octocrab.
//! Every call is made once: failures go back to the caller, which decides
//! whether to abort the event or log and carry on.

mod client;
mod error;
mod interpreter;

pub use client::{OctocrabClient, build_octocrab};
pub use error::GitHubApiError;
pub use interpreter::interpret_github_effect;
