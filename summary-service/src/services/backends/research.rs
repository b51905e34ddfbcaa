//! Deep-research backend: `POST {base_url}/api/research`.

use super::{http_client, join_url, BackendError, SummaryBackend, RESEARCH_TARGET};
use crate::config::ResearchConfig;
use crate::models::{extract_report, ExtractedText, SummaryRequest};
use crate::services::prompt::{research_prompt, research_query};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use service_core::observability::PropagateTrace;
use std::time::Duration;

pub struct ResearchReportBackend {
    client: Client,
    endpoint: String,
    report_type: String,
    timeout: Duration,
}

impl ResearchReportBackend {
    pub fn new(config: &ResearchConfig) -> Result<Self, BackendError> {
        let timeout = config.timeout();
        Ok(Self {
            client: http_client(timeout)?,
            endpoint: join_url(&config.base_url, "/api/research"),
            report_type: config.report_type.clone(),
            timeout,
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> BackendError {
        BackendError::from_reqwest(err, RESEARCH_TARGET, &self.endpoint, self.timeout)
    }
}

#[async_trait]
impl SummaryBackend for ResearchReportBackend {
    fn name(&self) -> &'static str {
        "research"
    }

    async fn fetch_summary(&self, request: &SummaryRequest) -> Result<String, BackendError> {
        let payload = ResearchRequest {
            query: research_query(request),
            report_type: &self.report_type,
            source_urls: Vec::new(),
            custom_prompt: research_prompt(request),
        };

        tracing::debug!(
            endpoint = %self.endpoint,
            report_type = %self.report_type,
            "Posting to research endpoint"
        );

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

        let body: serde_json::Value = response.json().await.map_err(|e| {
            if e.is_decode() {
                BackendError::Malformed {
                    target: RESEARCH_TARGET,
                    detail: e.to_string(),
                }
            } else {
                self.transport_error(e)
            }
        })?;

        match extract_report(&body) {
            ExtractedText::Text(text) if text.trim().is_empty() => Err(BackendError::Empty {
                target: RESEARCH_TARGET,
            }),
            ExtractedText::Text(text) => Ok(text),
            ExtractedText::Missing => Err(BackendError::MissingField {
                target: RESEARCH_TARGET,
                fields: "text or report",
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct ResearchRequest<'a> {
    query: String,
    report_type: &'a str,
    source_urls: Vec<String>,
    custom_prompt: String,
}
