//! HTTP server for the CI dispatch bot.
//!
//! # Endpoints
//!
//! - `POST /api/github/hook` - Handles a GitHub webhook delivery synchronously
//! - `GET /healthz` - Returns 200 if the server is running
//! - `GET /` - Returns a banner with the running version

use std::fmt;
use std::sync::Arc;

use octocrab::Octocrab;

use crate::config::ConfigLoader;
use crate::effects::GitHubInterpreter;
use crate::github::OctocrabClient;
use crate::types::RepoId;

pub mod health;
pub mod webhook;

pub use health::{health_handler, root_handler};
pub use webhook::webhook_handler;

/// Produces a GitHub interpreter scoped to one repository.
///
/// Each webhook delivery names its repository; the connector turns that into
/// the client the handlers run their effects through.
pub trait GitHubConnector: Send + Sync + 'static {
    type Client: GitHubInterpreter<Error: fmt::Display> + Send + Sync;

    fn connect(&self, repo: RepoId) -> Self::Client;
}

impl GitHubConnector for Octocrab {
    type Client = OctocrabClient;

    fn connect(&self, repo: RepoId) -> OctocrabClient {
        OctocrabClient::new(self.clone(), repo)
    }
}

/// Shared application state.
///
/// This is passed to all handlers via Axum's `State` extractor.
pub struct AppState<C, L> {
    inner: Arc<AppStateInner<C, L>>,
}

struct AppStateInner<C, L> {
    connector: C,
    loader: L,
    version: String,
}

impl<C, L> Clone for AppState<C, L> {
    fn clone(&self) -> Self {
        AppState {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C, L> AppState<C, L>
where
    C: GitHubConnector,
    L: ConfigLoader + Send + Sync + 'static,
{
    pub fn new(connector: C, loader: L, version: impl Into<String>) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                connector,
                loader,
                version: version.into(),
            }),
        }
    }

    pub fn connector(&self) -> &C {
        &self.inner.connector
    }

    pub fn loader(&self) -> &L {
        &self.inner.loader
    }

    /// The version shown on `/`.
    pub fn version(&self) -> &str {
        &self.inner.version
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router<C, L>(app_state: AppState<C, L>) -> axum::Router
where
    C: GitHubConnector,
    L: ConfigLoader + Send + Sync + 'static,
{
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/api/github/hook", post(webhook_handler::<C, L>))
        .route("/healthz", get(health_handler))
        .route("/", get(root_handler::<C, L>))
        .with_state(app_state)
}
