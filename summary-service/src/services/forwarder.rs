//! The summary forwarder: one request in, one backend call (plus any fallback
//! the backend does itself), one text out.

use super::backends::{BackendError, SummaryBackend};
use crate::models::SummaryRequest;
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct SummaryForwarder {
    backend: Arc<dyn SummaryBackend>,
}

impl SummaryForwarder {
    pub fn new(backend: Arc<dyn SummaryBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    #[tracing::instrument(
        skip(self, request),
        fields(
            book = %request.book_name,
            author = %request.author,
            backend = self.backend.name(),
        )
    )]
    pub async fn generate_summary(&self, request: &SummaryRequest) -> Result<String, BackendError> {
        let backend = self.backend.name();
        tracing::info!("Requesting summary from backend");

        let start = Instant::now();
        let result = self.backend.fetch_summary(request).await;
        let elapsed = start.elapsed();

        histogram!("summary_backend_latency_seconds", "backend" => backend)
            .record(elapsed.as_secs_f64());

        match &result {
            Ok(text) => {
                tracing::info!(
                    length = text.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Summary generated"
                );
                counter!("summary_requests_total", "backend" => backend, "outcome" => "ok")
                    .increment(1);
            }
            Err(e) => {
                tracing::error!(
                    error_kind = e.kind(),
                    error = %e,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Summary generation failed"
                );
                counter!("summary_requests_total", "backend" => backend, "outcome" => e.kind())
                    .increment(1);
            }
        }

        result
    }
}

/// Flatten a backend outcome into the always-text response body.
///
/// Failures start with `Error: `, which is what browser clients look for.
pub fn render_outcome(result: Result<String, BackendError>) -> String {
    match result {
        Ok(text) => text,
        Err(e) => format!("Error: {}", e),
    }
}
