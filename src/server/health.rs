//! Liveness and banner endpoints.

use axum::extract::State;
use axum::http::StatusCode;

use super::{AppState, GitHubConnector};
use crate::config::ConfigLoader;

/// Health check handler.
///
/// Returns 200 OK with the text "OK".
pub async fn health_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// Banner naming the running version.
///
/// ```ignore
/// GET / HTTP/1.1
///
/// HTTP/1.1 200 OK
///
/// Ariane is running!
/// Version: 0.0.1-dirty
/// ```
pub async fn root_handler<C, L>(State(app_state): State<AppState<C, L>>) -> String
where
    C: GitHubConnector,
    L: ConfigLoader + Send + Sync + 'static,
{
    format!("Ariane is running!\nVersion: {}", app_state.version())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_returns_200_ok() {
        let (status, body) = health_handler().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }
}
