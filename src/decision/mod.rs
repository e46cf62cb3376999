//! The workflow-selection decision engine.
//!
//! Everything here is pure: given the repository configuration, a comment
//! body, the changed files and the last run of a workflow, decide what to
//! do. GitHub calls happen in [`crate::webhooks::handlers`].

pub mod paths;
pub mod run_state;
pub mod trigger;

pub use paths::{is_relevant, should_run, should_run_unconfigured};
pub use run_state::should_skip;
pub use trigger::{TriggerMatch, match_trigger};
