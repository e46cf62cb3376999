//! Octocrab client wrapper scoped to a specific repository.
//!
//! Effects don't carry repository information; the repository comes from the
//! webhook event and is fixed when the `OctocrabClient` is built.

use std::time::Duration;

use octocrab::Octocrab;

use crate::config::GitHubConfig;
use crate::types::RepoId;

/// A GitHub API client scoped to a specific repository.
#[derive(Clone)]
pub struct OctocrabClient {
    client: Octocrab,
    repo: RepoId,
}

impl OctocrabClient {
    /// Creates a new client scoped to the given repository.
    ///
    /// `Octocrab` is cheap to clone, so one shared instance can back a client
    /// per event.
    pub fn new(client: Octocrab, repo: RepoId) -> Self {
        Self { client, repo }
    }

    /// Returns a reference to the underlying octocrab client.
    pub fn inner(&self) -> &Octocrab {
        &self.client
    }

    pub fn repo(&self) -> &RepoId {
        &self.repo
    }

    pub fn owner(&self) -> &str {
        &self.repo.owner
    }

    pub fn repo_name(&self) -> &str {
        &self.repo.repo
    }
}

impl std::fmt::Debug for OctocrabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OctocrabClient")
            .field("repo", &self.repo)
            .finish_non_exhaustive()
    }
}

/// Builds the process-wide octocrab instance from the server settings.
pub fn build_octocrab(config: &GitHubConfig, timeout: Duration) -> Result<Octocrab, octocrab::Error> {
    let mut builder = Octocrab::builder()
        .personal_token(config.token.clone())
        .set_connect_timeout(Some(timeout))
        .set_read_timeout(Some(timeout))
        .set_write_timeout(Some(timeout));
    if let Some(url) = &config.api_url {
        builder = builder.base_uri(url.as_str())?;
    }
    builder.build()
}
