//! Plain summarizer backend: `POST {base_url}/summarize`, no fallback.

use super::{http_client, join_url, BackendError, SummaryBackend, RESEARCH_TARGET};
use crate::config::ResearchConfig;
use crate::models::{extract_summary, ExtractedText, SummaryRequest};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use service_core::observability::PropagateTrace;
use std::time::Duration;

pub struct DirectSummarizeBackend {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl DirectSummarizeBackend {
    pub fn new(config: &ResearchConfig) -> Result<Self, BackendError> {
        let timeout = config.timeout();
        Ok(Self {
            client: http_client(timeout)?,
            endpoint: join_url(&config.base_url, "/summarize"),
            timeout,
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> BackendError {
        BackendError::from_reqwest(err, RESEARCH_TARGET, &self.endpoint, self.timeout)
    }
}

#[async_trait]
impl SummaryBackend for DirectSummarizeBackend {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn fetch_summary(&self, request: &SummaryRequest) -> Result<String, BackendError> {
        let payload = SummarizeRequest {
            name: &request.book_name,
            author: &request.author,
            publication_date: &request.publication_date,
        };

        tracing::debug!(endpoint = %self.endpoint, "Posting to summarize endpoint");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .propagate_trace()
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(BackendError::Status {
                target: RESEARCH_TARGET,
                status: status.as_u16(),
            });
        }

        let raw = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        let body: serde_json::Value =
            serde_json::from_str(&raw).map_err(|e| BackendError::Malformed {
                target: RESEARCH_TARGET,
                detail: e.to_string(),
            })?;

        match extract_summary(&body) {
            ExtractedText::Text(text) if text.trim().is_empty() => Err(BackendError::Empty {
                target: RESEARCH_TARGET,
            }),
            ExtractedText::Text(text) => Ok(text),
            ExtractedText::Missing => {
                // Older summarizers answer with the report object itself.
                tracing::debug!("Response has no summary field, returning raw body");
                Ok(raw)
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct SummarizeRequest<'a> {
    name: &'a str,
    author: &'a str,
    publication_date: &'a str,
}
