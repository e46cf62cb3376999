//! Newtype wrappers for domain identifiers.
//!
//! These types prevent accidental mixing of different ID types (e.g., passing a
//! workflow file name where a branch ref is expected) and make signatures
//! self-documenting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Directory (relative to the repository root) that holds workflow files.
pub const WORKFLOWS_DIR: &str = ".github/workflows";

/// A pull request number within a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrNumber(pub u64);

impl fmt::Display for PrNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for PrNumber {
    fn from(n: u64) -> Self {
        PrNumber(n)
    }
}

/// A git commit SHA.
///
/// Not validated: GitHub is the only producer of these values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sha(pub String);

impl Sha {
    pub fn new(s: impl Into<String>) -> Self {
        Sha(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a short (7-character) version of the SHA for display.
    pub fn short(&self) -> &str {
        self.0.get(..7).unwrap_or(&self.0)
    }
}

impl fmt::Display for Sha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Sha {
    fn from(s: &str) -> Self {
        Sha(s.to_string())
    }
}

/// A repository identifier (owner/repo format).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        RepoId {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// A GitHub webhook delivery ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryId(pub String);

impl DeliveryId {
    pub fn new(s: impl Into<String>) -> Self {
        DeliveryId(s.into())
    }
}

impl fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A GitHub issue comment ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub u64);

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A workflow identifier: the workflow's file name, e.g. `ci.yaml`.
///
/// Compared byte-for-byte. The same literal appears in trigger definitions, in
/// the `workflows` rule table and in the GitHub Actions API paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowId(pub String);

impl WorkflowId {
    pub fn new(s: impl Into<String>) -> Self {
        WorkflowId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Repository-relative path of the workflow file.
    pub fn file_path(&self) -> String {
        format!("{}/{}", WORKFLOWS_DIR, self.0)
    }
}

impl fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for WorkflowId {
    fn from(s: &str) -> Self {
        WorkflowId(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn pr_number_displays_with_hash() {
        assert_eq!(PrNumber(42).to_string(), "#42");
    }

    #[test]
    fn sha_short_handles_short_input() {
        assert_eq!(Sha::new("abc").short(), "abc");
        assert_eq!(Sha::new("0123456789abcdef").short(), "0123456");
    }

    #[test]
    fn workflow_file_path_is_under_workflows_dir() {
        assert_eq!(
            WorkflowId::from("ci.yaml").file_path(),
            ".github/workflows/ci.yaml"
        );
    }

    #[test]
    fn workflow_id_is_case_sensitive() {
        assert_ne!(WorkflowId::from("CI.yaml"), WorkflowId::from("ci.yaml"));
    }

    proptest! {
        #[test]
        fn repo_id_display_format(
            owner in "[a-zA-Z][a-zA-Z0-9-]{0,38}",
            repo in "[a-zA-Z][a-zA-Z0-9_-]{0,99}"
        ) {
            let id = RepoId::new(&owner, &repo);
            prop_assert_eq!(format!("{}", id), format!("{}/{}", owner, repo));
        }

        #[test]
        fn workflow_id_deserializes_from_bare_string(name in "[a-z][a-z0-9-]{0,20}\\.ya?ml") {
            let parsed: WorkflowId = serde_json::from_str(&format!("\"{}\"", name)).unwrap();
            prop_assert_eq!(parsed.as_str(), name.as_str());
        }
    }
}
