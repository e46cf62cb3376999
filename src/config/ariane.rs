//! The per-repository rule set, read from `.github/ariane-config.yaml`.
//!
//! ```yaml
//! triggers:
//!   /test:
//!     workflows: [ci.yaml]
//!   /ci-e2e( .+)?:
//!     workflows: [e2e.yaml, conformance.yaml]
//! workflows:
//!   e2e.yaml:
//!     paths-ignore-regex: (Documentation|test)/
//!   conformance.yaml:
//!     paths-regex: (pkg|daemon)/
//! allowed-teams:
//!   - organization-members
//! ```

use std::collections::HashMap;

use serde::Deserialize;

use super::ConfigError;
use crate::types::WorkflowId;

/// Repository-relative path of the configuration document.
pub const CONFIG_PATH: &str = ".github/ariane-config.yaml";

/// A trigger phrase and the workflows it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    /// Regular expression matched against the whole comment body.
    pub pattern: String,
    pub workflows: Vec<WorkflowId>,
}

impl Trigger {
    pub fn new(pattern: impl Into<String>, workflows: Vec<WorkflowId>) -> Self {
        Trigger {
            pattern: pattern.into(),
            workflows,
        }
    }
}

/// Path rules deciding whether a workflow is relevant to a change set.
///
/// An empty string is treated the same as an absent key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WorkflowPathRules {
    #[serde(default)]
    pub paths_regex: Option<String>,
    #[serde(default)]
    pub paths_ignore_regex: Option<String>,
}

impl WorkflowPathRules {
    pub fn paths_regex(&self) -> Option<&str> {
        self.paths_regex.as_deref().filter(|s| !s.is_empty())
    }

    pub fn paths_ignore_regex(&self) -> Option<&str> {
        self.paths_ignore_regex.as_deref().filter(|s| !s.is_empty())
    }
}

/// Parsed repository configuration.
///
/// `triggers` keeps the order of the configuration document; that order is
/// the evaluation order when a comment could match several patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArianeConfig {
    pub triggers: Vec<Trigger>,
    pub workflows: HashMap<WorkflowId, WorkflowPathRules>,
    /// Team slugs whose active members may trigger workflows. Empty allows everyone.
    pub allowed_teams: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawConfig {
    #[serde(default)]
    triggers: serde_yaml::Mapping,
    #[serde(default)]
    workflows: HashMap<WorkflowId, Option<WorkflowPathRules>>,
    #[serde(default)]
    allowed_teams: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawTrigger {
    #[serde(default)]
    workflows: Vec<WorkflowId>,
}

impl ArianeConfig {
    /// Parses a configuration document.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_yaml::from_str(text)?;

        let mut triggers = Vec::with_capacity(raw.triggers.len());
        for (key, value) in raw.triggers {
            // Scalar keys are read as their text, e.g. `42:` is the pattern "42".
            let pattern = match key {
                serde_yaml::Value::String(s) => s,
                serde_yaml::Value::Number(n) => n.to_string(),
                serde_yaml::Value::Bool(b) => b.to_string(),
                other => {
                    return Err(ConfigError::Invalid(format!(
                        "trigger pattern must be a string, got {:?}",
                        other
                    )));
                }
            };
            let trigger: Option<RawTrigger> = serde_yaml::from_value(value)?;
            let workflows = trigger.map(|t| t.workflows).unwrap_or_default();
            triggers.push(Trigger { pattern, workflows });
        }

        let workflows = raw
            .workflows
            .into_iter()
            .map(|(id, rules)| (id, rules.unwrap_or_default()))
            .collect();

        Ok(ArianeConfig {
            triggers,
            workflows,
            allowed_teams: raw.allowed_teams,
        })
    }

    /// Returns the path rules for a workflow, if it has an entry.
    pub fn rules_for(&self, workflow: &WorkflowId) -> Option<&WorkflowPathRules> {
        self.workflows.get(workflow)
    }
}
