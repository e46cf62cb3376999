//! Effects-as-data for GitHub operations.
//!
//! The decision logic never talks to GitHub directly. It builds
//! [`GitHubEffect`] values and hands them to a [`GitHubInterpreter`]; the
//! production interpreter lives in [`crate::github`], tests use a recording
//! mock.

pub mod github;
pub mod interpreter;

pub use github::{
    DispatchInputs, GitHubEffect, GitHubResponse, JobData, PrData, Reaction, RequiredCheck,
    WorkflowData,
};
pub use interpreter::GitHubInterpreter;
