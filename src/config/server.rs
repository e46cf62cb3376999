//! Process settings.
//!
//! Read from `server-config.yaml` when that file exists, otherwise from the
//! environment:
//!
//! | Variable                | Default        |
//! |-------------------------|----------------|
//! | `GITHUB_TOKEN`          | required       |
//! | `GITHUB_V3_API_URL`     | api.github.com |
//! | `ARIANE_SERVER_ADDRESS` | `127.0.0.1`    |
//! | `ARIANE_SERVER_PORT`    | `8080`         |
//! | `ARIANE_RUN_DELAY`      | `30s`          |
//! | `ARIANE_VERSION`        | `0.0.1-dirty`  |
//!
//! The run delay is bare seconds (`45`) or a duration with units (`45s`,
//! `1m30s`, `2h`); the file key is `run-delay` or `runDelay`. Unparseable
//! values fall back to their defaults.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Default settings file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "server-config.yaml";

const DEFAULT_ADDRESS: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_RUN_DELAY_SECS: u64 = 30;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 3;
const DEFAULT_VERSION: &str = "0.0.1-dirty";

#[derive(Debug, Error)]
pub enum ServerConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse server configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("no GitHub token configured (set GITHUB_TOKEN or github.token)")]
    MissingToken,
}

/// Where the HTTP server listens.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            address: default_address(),
            port: DEFAULT_PORT,
        }
    }
}

impl HttpConfig {
    /// `address:port`, suitable for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

/// GitHub API access.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct GitHubConfig {
    /// Base URL of the REST API. `None` uses api.github.com.
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub token: String,
}

impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ServerConfig {
    #[serde(default)]
    pub server: HttpConfig,
    pub github: GitHubConfig,
    /// Seconds to wait after re-running a commit status job.
    #[serde(
        default = "default_run_delay",
        alias = "runDelay",
        deserialize_with = "deserialize_delay"
    )]
    pub run_delay: u64,
    /// Seconds before an outgoing GitHub request is abandoned.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_address() -> String {
    DEFAULT_ADDRESS.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_run_delay() -> u64 {
    DEFAULT_RUN_DELAY_SECS
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

/// Parses `45`, `45s`, `1m30s` or `2h` into whole seconds.
///
/// Sub-second components (`ms`) are truncated.
fn parse_delay_secs(text: &str) -> Option<u64> {
    let text = text.trim();
    if let Ok(secs) = text.parse() {
        return Some(secs);
    }
    if text.is_empty() {
        return None;
    }

    let mut total_ms: u64 = 0;
    let mut rest = text;
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digits == 0 {
            return None;
        }
        let value: u64 = rest[..digits].parse().ok()?;
        rest = &rest[digits..];

        let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let per_unit_ms = match &rest[..unit_len] {
            "ms" => 1,
            "s" => 1_000,
            "m" => 60_000,
            "h" => 3_600_000,
            _ => return None,
        };
        rest = &rest[unit_len..];
        total_ms = total_ms.checked_add(value.checked_mul(per_unit_ms)?)?;
    }
    Some(total_ms / 1_000)
}

fn deserialize_delay<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Delay {
        Secs(u64),
        Text(String),
    }

    match Delay::deserialize(deserializer)? {
        Delay::Secs(secs) => Ok(secs),
        Delay::Text(text) => Ok(parse_delay_secs(&text).unwrap_or(DEFAULT_RUN_DELAY_SECS)),
    }
}

impl ServerConfig {
    /// Reads the settings file at `path` if it exists, the environment otherwise.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ServerConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            Self::from_env()
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ServerConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ServerConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ServerConfigError> {
        let config: ServerConfig = serde_yaml::from_str(text)?;
        config.validated()
    }

    pub fn from_env() -> Result<Self, ServerConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the settings from a variable lookup function.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServerConfigError> {
        let config = ServerConfig {
            server: HttpConfig {
                address: lookup("ARIANE_SERVER_ADDRESS")
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(default_address),
                port: lookup("ARIANE_SERVER_PORT")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_PORT),
            },
            github: GitHubConfig {
                api_url: lookup("GITHUB_V3_API_URL").filter(|s| !s.is_empty()),
                token: lookup("GITHUB_TOKEN").unwrap_or_default(),
            },
            run_delay: lookup("ARIANE_RUN_DELAY")
                .and_then(|s| parse_delay_secs(&s))
                .unwrap_or(DEFAULT_RUN_DELAY_SECS),
            request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
            version: lookup("ARIANE_VERSION")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(default_version),
        };
        config.validated()
    }

    fn validated(self) -> Result<Self, ServerConfigError> {
        if self.github.token.trim().is_empty() {
            return Err(ServerConfigError::MissingToken);
        }
        Ok(self)
    }

    pub fn run_delay(&self) -> Duration {
        Duration::from_secs(self.run_delay)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}
