//! Chat-completion backend, used as the fallback when deep research fails.
//!
//! Speaks the OpenAI `chat/completions` shape, so any compatible gateway can
//! be configured through `OPENAI_API_BASE`.

use super::{http_client, join_url, BackendError, SummaryBackend, COMPLETION_TARGET};
use crate::config::CompletionConfig;
use crate::models::SummaryRequest;
use crate::services::prompt::research_prompt;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use service_core::observability::PropagateTrace;
use std::time::Duration;

pub struct CompletionBackend {
    client: Client,
    endpoint: String,
    api_key: Secret<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl CompletionBackend {
    /// Fails when no credential is configured, so a misconfigured fallback is
    /// caught at startup rather than on the first failed research call.
    pub fn new(config: &CompletionConfig) -> Result<Self, BackendError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.expose_secret().trim().is_empty())
            .ok_or_else(|| {
                BackendError::NotConfigured("completion API key not configured".to_string())
            })?;

        Ok(Self {
            client: http_client(config.timeout())?,
            endpoint: join_url(&config.api_base, "/chat/completions"),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: config.timeout(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl SummaryBackend for CompletionBackend {
    fn name(&self) -> &'static str {
        "completion"
    }

    async fn fetch_summary(&self, request: &SummaryRequest) -> Result<String, BackendError> {
        let prompt = research_prompt(request);
        let payload = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        tracing::debug!(
            model = %self.model,
            prompt_len = prompt.len(),
            "Sending request to completion API"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&payload)
            .propagate_trace()
            .send()
            .await
            .map_err(|e| {
                BackendError::from_reqwest(e, COMPLETION_TARGET, &self.endpoint, self.timeout)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                body = %error_text,
                "Completion API returned an error"
            );
            return Err(BackendError::Status {
                target: COMPLETION_TARGET,
                status: status.as_u16(),
            });
        }

        let api_response: ChatCompletionResponse =
            response.json().await.map_err(|e| BackendError::Malformed {
                target: COMPLETION_TARGET,
                detail: e.to_string(),
            })?;

        let content = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(BackendError::MissingField {
                target: COMPLETION_TARGET,
                fields: "choices[0].message.content",
            })?;

        let text = content.trim();
        if text.is_empty() {
            return Err(BackendError::Empty {
                target: COMPLETION_TARGET,
            });
        }

        Ok(text.to_string())
    }
}

// ============================================================================
// Chat Completion Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}
