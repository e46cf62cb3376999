//! Deciding whether a workflow is relevant to the files a PR changes.

use regex::Regex;
use tracing::{debug, warn};

use crate::config::ArianeConfig;
use crate::types::{ChangedFile, WORKFLOWS_DIR, WorkflowId};

/// Relevance of a workflow with no entry in the `workflows` section.
///
/// Runs unless the change set is empty or touches nothing but other
/// workflow files.
pub fn should_run_unconfigured(workflow: &WorkflowId, files: &[ChangedFile]) -> bool {
    let own_file = workflow.file_path();
    files
        .iter()
        .any(|f| !f.filename.starts_with(WORKFLOWS_DIR) || f.filename == own_file)
}

/// Relevance of a workflow according to its `paths-regex` /
/// `paths-ignore-regex` rules.
///
/// Changing the workflow's own file always makes it relevant. Changes to
/// other files under `.github/workflows` never do.
pub fn should_run(config: &ArianeConfig, workflow: &WorkflowId, files: &[ChangedFile]) -> bool {
    if files.is_empty() {
        return false;
    }

    let Some(rules) = config.rules_for(workflow) else {
        return false;
    };

    let paths = rules.paths_regex();
    let ignore = rules.paths_ignore_regex();
    // Both set is unsupported; run unconditionally.
    if paths.is_some() && ignore.is_some() {
        return true;
    }

    let Ok(paths_re) = compile_prefix(workflow, paths) else {
        return false;
    };
    let Ok(ignore_re) = compile_prefix(workflow, ignore) else {
        return false;
    };

    let own_file = workflow.file_path();
    let mut ignored = 0;
    for file in files {
        let name = file.filename.as_str();
        if name == own_file || paths_re.as_ref().is_some_and(|re| re.is_match(name)) {
            debug!(%workflow, file = name, "file makes workflow relevant");
            return true;
        }
        if name.starts_with(WORKFLOWS_DIR) {
            ignored += 1;
            continue;
        }
        if ignore_re.as_ref().is_some_and(|re| re.is_match(name)) {
            ignored += 1;
        }
    }

    if paths_re.is_some() {
        // Nothing matched paths-regex.
        return false;
    }

    ignored < files.len()
}

/// Picks the configured or unconfigured rule for a workflow.
pub fn is_relevant(config: &ArianeConfig, workflow: &WorkflowId, files: &[ChangedFile]) -> bool {
    if config.rules_for(workflow).is_some() {
        should_run(config, workflow, files)
    } else {
        should_run_unconfigured(workflow, files)
    }
}

fn compile_prefix(workflow: &WorkflowId, pattern: Option<&str>) -> Result<Option<Regex>, ()> {
    let Some(pattern) = pattern else {
        return Ok(None);
    };
    Regex::new(&format!("^{}", pattern)).map(Some).map_err(|e| {
        warn!(%workflow, pattern, error = %e, "cannot compile path regex");
    })
}
