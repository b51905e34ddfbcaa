//! Downstream summary backends.
//!
//! Every way of turning a [`SummaryRequest`] into text sits behind
//! [`SummaryBackend`], so the forwarder never knows whether it is talking to a
//! plain summarizer, a research service, or a research service with a
//! completion fallback.

pub mod completion;
pub mod direct;
pub mod fallback;
pub mod mock;
pub mod research;

pub use completion::CompletionBackend;
pub use direct::DirectSummarizeBackend;
pub use fallback::FallbackBackend;
pub use mock::MockBackend;
pub use research::ResearchReportBackend;

use crate::models::SummaryRequest;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub(crate) const RESEARCH_TARGET: &str = "the research backend";
pub(crate) const COMPLETION_TARGET: &str = "the completion API";

/// Error type for backend operations.
#[derive(Error, Debug, Clone)]
pub enum BackendError {
    #[error("could not connect to {target} at {url}")]
    Connect { target: &'static str, url: String },

    #[error("request to {target} timed out after {}", human_duration(.after))]
    Timeout {
        target: &'static str,
        after: Duration,
    },

    #[error("{target} returned HTTP {status}")]
    Status { target: &'static str, status: u16 },

    #[error("{target} response had no {fields} field")]
    MissingField {
        target: &'static str,
        fields: &'static str,
    },

    #[error("{target} returned an empty summary")]
    Empty { target: &'static str },

    #[error("{target} returned an unreadable response: {detail}")]
    Malformed {
        target: &'static str,
        detail: String,
    },

    #[error("backend not configured: {0}")]
    NotConfigured(String),

    #[error("error communicating with {target}: {detail}")]
    Request {
        target: &'static str,
        detail: String,
    },

    /// Both attempts failed. Only the fallback's error is part of the message.
    #[error("fallback completion failed: {fallback}")]
    Fallback {
        primary: Box<BackendError>,
        #[source]
        fallback: Box<BackendError>,
    },
}

impl BackendError {
    /// Short stable label for logs, metrics and the `x-summary-error` header.
    pub fn kind(&self) -> &'static str {
        match self {
            BackendError::Connect { .. } => "connect",
            BackendError::Timeout { .. } => "timeout",
            BackendError::Status { .. } => "status",
            BackendError::MissingField { .. } => "missing_field",
            BackendError::Empty { .. } => "empty",
            BackendError::Malformed { .. } => "malformed",
            BackendError::NotConfigured(_) => "not_configured",
            BackendError::Request { .. } => "request",
            BackendError::Fallback { .. } => "fallback",
        }
    }

    /// Map a transport error onto the connect/timeout/other split callers care about.
    pub(crate) fn from_reqwest(
        err: reqwest::Error,
        target: &'static str,
        url: &str,
        timeout: Duration,
    ) -> Self {
        if err.is_timeout() {
            BackendError::Timeout {
                target,
                after: timeout,
            }
        } else if err.is_connect() {
            BackendError::Connect {
                target,
                url: url.to_string(),
            }
        } else {
            BackendError::Request {
                target,
                detail: err.to_string(),
            }
        }
    }
}

/// Capability shared by every backend.
#[async_trait]
pub trait SummaryBackend: Send + Sync {
    /// Label used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Produce the analysis text for one book.
    async fn fetch_summary(&self, request: &SummaryRequest) -> Result<String, BackendError>;
}

/// Build an HTTP client whose whole-request timeout is `timeout`.
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, BackendError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| BackendError::NotConfigured(format!("failed to create HTTP client: {}", e)))
}

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// "20 minutes", "90 seconds", "1 second", "250ms".
pub fn human_duration(duration: &Duration) -> String {
    let secs = duration.as_secs();
    if duration.subsec_nanos() != 0 {
        return format!("{}ms", duration.as_millis());
    }
    match secs {
        s if s >= 60 && s % 60 == 0 => plural(s / 60, "minute"),
        s => plural(s, "second"),
    }
}

fn plural(n: u64, unit: &str) -> String {
    if n == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_duration_prefers_whole_minutes() {
        assert_eq!(human_duration(&Duration::from_secs(1200)), "20 minutes");
        assert_eq!(human_duration(&Duration::from_secs(60)), "1 minute");
        assert_eq!(human_duration(&Duration::from_secs(90)), "90 seconds");
        assert_eq!(human_duration(&Duration::from_secs(1)), "1 second");
        assert_eq!(human_duration(&Duration::from_millis(250)), "250ms");
    }

    #[test]
    fn error_messages_name_the_target() {
        let err = BackendError::Status {
            target: RESEARCH_TARGET,
            status: 500,
        };
        assert_eq!(err.to_string(), "the research backend returned HTTP 500");

        let err = BackendError::Timeout {
            target: RESEARCH_TARGET,
            after: Duration::from_secs(1200),
        };
        assert_eq!(
            err.to_string(),
            "request to the research backend timed out after 20 minutes"
        );
    }

    #[test]
    fn fallback_message_carries_only_the_fallback_error() {
        let err = BackendError::Fallback {
            primary: Box::new(BackendError::Status {
                target: RESEARCH_TARGET,
                status: 500,
            }),
            fallback: Box::new(BackendError::Status {
                target: COMPLETION_TARGET,
                status: 401,
            }),
        };

        let message = err.to_string();
        assert_eq!(
            message,
            "fallback completion failed: the completion API returned HTTP 401"
        );
        assert!(!message.contains("500"));
        assert_eq!(err.kind(), "fallback");
    }

    #[test]
    fn join_url_tolerates_trailing_slash() {
        assert_eq!(
            join_url("http://localhost:8001/", "/summarize"),
            "http://localhost:8001/summarize"
        );
        assert_eq!(
            join_url("http://localhost:8001", "/api/research"),
            "http://localhost:8001/api/research"
        );
    }
}
