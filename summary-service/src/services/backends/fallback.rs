//! Primary-then-fallback composition.

use super::{BackendError, SummaryBackend};
use crate::models::SummaryRequest;
use async_trait::async_trait;
use metrics::counter;
use std::sync::Arc;

/// Tries `primary`; on any error makes exactly one attempt with `fallback`.
pub struct FallbackBackend {
    primary: Arc<dyn SummaryBackend>,
    fallback: Arc<dyn SummaryBackend>,
}

impl FallbackBackend {
    pub fn new(primary: Arc<dyn SummaryBackend>, fallback: Arc<dyn SummaryBackend>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl SummaryBackend for FallbackBackend {
    fn name(&self) -> &'static str {
        self.primary.name()
    }

    async fn fetch_summary(&self, request: &SummaryRequest) -> Result<String, BackendError> {
        let primary_err = match self.primary.fetch_summary(request).await {
            Ok(text) => return Ok(text),
            Err(e) => e,
        };

        tracing::warn!(
            primary = self.primary.name(),
            fallback = self.fallback.name(),
            error_kind = primary_err.kind(),
            error = %primary_err,
            "Primary backend failed, falling back"
        );
        counter!("summary_fallbacks_total", "reason" => primary_err.kind()).increment(1);

        self.fallback
            .fetch_summary(request)
            .await
            .map_err(|fallback_err| BackendError::Fallback {
                primary: Box::new(primary_err),
                fallback: Box::new(fallback_err),
            })
    }
}
