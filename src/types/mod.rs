//! Core domain types for the CI dispatch bot.

pub mod ids;
pub mod run;

pub use ids::{CommentId, DeliveryId, PrNumber, RepoId, Sha, WORKFLOWS_DIR, WorkflowId};
pub use run::{ChangedFile, RunConclusion, RunStatus, WorkflowRunState};
