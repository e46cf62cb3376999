//! Configuration: the per-repository rule set and the process settings.

use thiserror::Error;

pub mod ariane;
pub mod loader;
pub mod server;

pub use ariane::{ArianeConfig, CONFIG_PATH, Trigger, WorkflowPathRules};
pub use loader::{ConfigLoader, RepositoryConfigLoader, StaticConfigLoader};
pub use server::{DEFAULT_CONFIG_FILE, GitHubConfig, HttpConfig, ServerConfig, ServerConfigError};

/// Errors from loading the repository configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file doesn't exist at the requested ref.
    #[error("{path} not found at ref {git_ref}")]
    NotFound { path: String, git_ref: String },

    /// The file could not be downloaded.
    #[error("failed to fetch configuration: {0}")]
    Fetch(String),

    /// The file is not valid YAML or doesn't have the expected shape.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The YAML parsed but holds a value the bot can't use.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
