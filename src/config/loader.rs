//! Loading the repository configuration for an event.

use std::fmt;
use std::future::Future;

use tracing::debug;

use super::{ArianeConfig, CONFIG_PATH, ConfigError};
use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse};

/// Source of the repository configuration at a given ref.
pub trait ConfigLoader {
    fn load<G>(
        &self,
        github: &G,
        git_ref: &str,
    ) -> impl Future<Output = Result<ArianeConfig, ConfigError>> + Send
    where
        G: GitHubInterpreter + Sync,
        G::Error: fmt::Display;
}

/// Reads [`CONFIG_PATH`] from the repository itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepositoryConfigLoader;

impl ConfigLoader for RepositoryConfigLoader {
    async fn load<G>(&self, github: &G, git_ref: &str) -> Result<ArianeConfig, ConfigError>
    where
        G: GitHubInterpreter + Sync,
        G::Error: fmt::Display,
    {
        let effect = GitHubEffect::GetFileContents {
            path: CONFIG_PATH.to_string(),
            git_ref: git_ref.to_string(),
        };
        match github.interpret(effect).await {
            Ok(GitHubResponse::FileContents(Some(text))) => {
                debug!(git_ref, bytes = text.len(), "loaded repository configuration");
                ArianeConfig::from_yaml(&text)
            }
            Ok(GitHubResponse::FileContents(None)) => Err(ConfigError::NotFound {
                path: CONFIG_PATH.to_string(),
                git_ref: git_ref.to_string(),
            }),
            Ok(other) => Err(ConfigError::Fetch(format!(
                "unexpected response to GetFileContents: {:?}",
                other
            ))),
            Err(e) => Err(ConfigError::Fetch(e.to_string())),
        }
    }
}

/// Always returns the same configuration, whatever the ref.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigLoader(pub ArianeConfig);

impl ConfigLoader for StaticConfigLoader {
    async fn load<G>(&self, _github: &G, _git_ref: &str) -> Result<ArianeConfig, ConfigError>
    where
        G: GitHubInterpreter + Sync,
        G::Error: fmt::Display,
    {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockGitHub;
    use crate::types::WorkflowId;

    #[tokio::test]
    async fn repository_loader_reads_config_at_ref() {
        let github = MockGitHub::new().with_file_contents(Some(
            "triggers:\n  /test:\n    workflows: [ci.yaml]\n".to_string(),
        ));

        let config = RepositoryConfigLoader.load(&github, "feature").await.unwrap();

        assert_eq!(config.triggers[0].workflows, vec![WorkflowId::from("ci.yaml")]);
        assert_eq!(
            github.recorded(),
            vec![GitHubEffect::GetFileContents {
                path: ".github/ariane-config.yaml".to_string(),
                git_ref: "feature".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let github = MockGitHub::new().with_file_contents(None);

        let result = RepositoryConfigLoader.load(&github, "main").await;

        assert!(matches!(result, Err(ConfigError::NotFound { git_ref, .. }) if git_ref == "main"));
    }

    #[tokio::test]
    async fn transport_failure_is_fetch_error() {
        let github = MockGitHub::new().failing_on("get_file_contents");

        let result = RepositoryConfigLoader.load(&github, "main").await;

        assert!(matches!(result, Err(ConfigError::Fetch(_))));
    }

    #[tokio::test]
    async fn invalid_yaml_is_parse_error() {
        let github = MockGitHub::new().with_file_contents(Some("triggers: [".to_string()));

        let result = RepositoryConfigLoader.load(&github, "main").await;

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[tokio::test]
    async fn static_loader_makes_no_calls() {
        let github = MockGitHub::new();
        let loader = StaticConfigLoader(ArianeConfig::default());

        let config = loader.load(&github, "main").await.unwrap();

        assert_eq!(config, ArianeConfig::default());
        assert!(github.recorded().is_empty());
    }
}
