//! Webhook endpoint handler.
//!
//! Deliveries are parsed and handled inline: the response is sent once every
//! GitHub call the event needs has completed.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{AppState, GitHubConnector};
use crate::config::ConfigLoader;
use crate::types::DeliveryId;
use crate::webhooks::{HandlerError, HandlerOutcome, ParseError, handle_event, parse_webhook};

/// Header name for GitHub event type.
const HEADER_EVENT: &str = "x-github-event";
/// Header name for GitHub delivery ID.
const HEADER_DELIVERY: &str = "x-github-delivery";

/// Errors that can occur when processing a webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Missing required header.
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    /// The payload doesn't match the event type.
    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] ParseError),

    /// Handling the event failed.
    #[error("failed to handle event: {0}")]
    Handler(#[from] HandlerError),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::MissingHeader(_) | WebhookError::InvalidPayload(_) => {
                StatusCode::BAD_REQUEST
            }
            WebhookError::Handler(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}

/// Webhook handler.
///
/// # Request
///
/// - Method: POST
/// - Required headers:
///   - `X-GitHub-Event`: Event type (e.g., "issue_comment", "merge_group")
/// - Optional headers:
///   - `X-GitHub-Delivery`: Delivery ID, for logs
/// - Body: JSON webhook payload
///
/// # Response
///
/// - 200 OK: Event handled, or nothing to do
/// - 400 Bad Request: Missing header or malformed payload
/// - 500 Internal Server Error: Handling failed
pub async fn webhook_handler<C, L>(
    State(app_state): State<AppState<C, L>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, String), WebhookError>
where
    C: GitHubConnector,
    L: ConfigLoader + Send + Sync + 'static,
{
    let event_type = get_header(&headers, HEADER_EVENT)?;
    let delivery_id = get_header(&headers, HEADER_DELIVERY)
        .map(DeliveryId::new)
        .unwrap_or_else(|_| DeliveryId::new("unknown"));

    debug!(
        delivery_id = %delivery_id,
        event_type = %event_type,
        "Received webhook"
    );

    let event = match parse_webhook(&event_type, &body) {
        Ok(Some(event)) => event,
        Ok(None) => {
            debug!(delivery_id = %delivery_id, event_type = %event_type, "Ignoring event");
            return Ok((StatusCode::OK, "Ignored".to_string()));
        }
        Err(e) => {
            warn!(delivery_id = %delivery_id, error = %e, "Malformed webhook payload");
            return Err(e.into());
        }
    };

    let repo = event.repo_id().clone();
    let github = app_state.connector().connect(repo.clone());

    match handle_event(&event, &github, app_state.loader()).await {
        Ok(outcome) => {
            let summary = summarize(&outcome);
            info!(
                delivery_id = %delivery_id,
                repo = %repo,
                event_type = event.event_type(),
                outcome = %summary,
                "Webhook handled"
            );
            Ok((StatusCode::OK, summary))
        }
        Err(e) => {
            warn!(
                delivery_id = %delivery_id,
                repo = %repo,
                event_type = event.event_type(),
                error = %e,
                "Failed to handle webhook"
            );
            Err(e.into())
        }
    }
}

/// Extracts a required header value as a string.
fn get_header(headers: &HeaderMap, name: &'static str) -> Result<String, WebhookError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .ok_or(WebhookError::MissingHeader(name))
}

fn summarize(outcome: &HandlerOutcome) -> String {
    match outcome {
        HandlerOutcome::Ignored(reason) => format!("Ignored: {}", reason),
        HandlerOutcome::Processed {
            dispatched,
            skipped,
            reused,
        } => format!(
            "Dispatched {}, skipped {}, reused {}",
            dispatched.len(),
            skipped.len(),
            reused.len()
        ),
        HandlerOutcome::ChecksReported { passed, failed } => {
            format!("Reported {} checks, {} failed", passed.len(), failed.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webhooks::IgnoreReason;

    #[test]
    fn get_header_missing() {
        let headers = HeaderMap::new();
        let result = get_header(&headers, HEADER_EVENT);
        assert!(matches!(
            result,
            Err(WebhookError::MissingHeader("x-github-event"))
        ));
    }

    #[test]
    fn get_header_present() {
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_EVENT, "merge_group".parse().unwrap());
        assert_eq!(get_header(&headers, HEADER_EVENT).unwrap(), "merge_group");
    }

    #[test]
    fn error_status_codes() {
        let missing = WebhookError::MissingHeader(HEADER_EVENT).into_response();
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        let handler =
            WebhookError::Handler(HandlerError::GitHub("boom".to_string())).into_response();
        assert_eq!(handler.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn outcome_summaries() {
        assert_eq!(
            summarize(&HandlerOutcome::Ignored(IgnoreReason::NoTrigger)),
            "Ignored: comment matches no trigger"
        );
        assert_eq!(
            summarize(&HandlerOutcome::Processed {
                dispatched: vec!["ci.yaml".into()],
                skipped: vec![],
                reused: vec!["e2e.yaml".into()],
            }),
            "Dispatched 1, skipped 0, reused 1"
        );
    }
}
