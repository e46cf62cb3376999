//! GitHub API error type.

use std::fmt;
use thiserror::Error;

/// A failed GitHub API call.
#[derive(Debug, Error)]
pub struct GitHubApiError {
    /// The HTTP status code, if available.
    pub status_code: Option<u16>,

    /// A human-readable description of the error.
    pub message: String,

    /// The underlying octocrab error, if available.
    #[source]
    pub source: Option<octocrab::Error>,
}

impl fmt::Display for GitHubApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "GitHub API error (HTTP {}): {}", code, self.message),
            None => write!(f, "GitHub API error: {}", self.message),
        }
    }
}

impl GitHubApiError {
    pub fn from_octocrab(err: octocrab::Error) -> Self {
        let status_code = Self::extract_status_code(&err);
        Self {
            status_code,
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Creates an error for a failure detected after a successful HTTP call.
    pub fn without_source(message: impl Into<String>) -> Self {
        Self {
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Whether GitHub answered 404 for the requested resource.
    pub fn is_not_found(&self) -> bool {
        self.status_code == Some(404) || is_not_found_message(&self.message)
    }

    /// Extracts the HTTP status code from an octocrab error, if present.
    ///
    /// octocrab doesn't expose the status uniformly across its error variants,
    /// so this falls back to reading the rendered message. `None` is a safe
    /// answer: callers then treat the error as a generic failure.
    fn extract_status_code(err: &octocrab::Error) -> Option<u16> {
        status_code_from_message(&err.to_string())
    }
}

fn status_code_from_message(err_str: &str) -> Option<u16> {
    if let Some(idx) = err_str.find("status: ") {
        let rest = &err_str[idx + 8..];
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        if let Ok(code) = rest[..end].parse() {
            return Some(code);
        }
    }

    if err_str.contains("404") || is_not_found_message(err_str) {
        return Some(404);
    }
    [422, 403, 401, 429, 500, 502, 503]
        .into_iter()
        .find(|code| err_str.contains(&code.to_string()))
}

fn is_not_found_message(message: &str) -> bool {
    message.to_lowercase().contains("not found")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_from_explicit_marker() {
        assert_eq!(status_code_from_message("request failed, status: 422"), Some(422));
        assert_eq!(status_code_from_message("status: 500 Internal"), Some(500));
    }

    #[test]
    fn status_from_not_found_text() {
        assert_eq!(status_code_from_message("GitHub: Not Found"), Some(404));
        assert_eq!(status_code_from_message("404"), Some(404));
    }

    #[test]
    fn status_from_bare_code() {
        assert_eq!(status_code_from_message("HTTP 403 Forbidden"), Some(403));
        assert_eq!(status_code_from_message("something else"), None);
    }

    #[test]
    fn not_found_detection() {
        let err = GitHubApiError::without_source("Team membership Not Found");
        assert!(err.is_not_found());

        let err = GitHubApiError {
            status_code: Some(404),
            message: "gone".to_string(),
            source: None,
        };
        assert!(err.is_not_found());

        assert!(!GitHubApiError::without_source("Bad credentials").is_not_found());
    }

    #[test]
    fn display_includes_status_when_known() {
        let err = GitHubApiError {
            status_code: Some(502),
            message: "Bad Gateway".to_string(),
            source: None,
        };
        assert_eq!(err.to_string(), "GitHub API error (HTTP 502): Bad Gateway");
        assert_eq!(
            GitHubApiError::without_source("boom").to_string(),
            "GitHub API error: boom"
        );
    }
}
