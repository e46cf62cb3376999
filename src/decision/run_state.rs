//! Deciding whether an existing run makes re-triggering unnecessary.

use crate::types::{RunConclusion, RunStatus, WorkflowRunState};

/// Whether the most recent run of a workflow for a commit already settles it.
///
/// Only a completed run that succeeded or was skipped counts. A failed run is
/// not re-run from here; the workflow is dispatched again instead.
pub fn should_skip(last_run: Option<&WorkflowRunState>) -> bool {
    match last_run {
        Some(run) if run.status == RunStatus::Completed => matches!(
            run.conclusion,
            Some(RunConclusion::Success) | Some(RunConclusion::Skipped)
        ),
        _ => false,
    }
}
