//! Mock backend for testing.

use super::{BackendError, SummaryBackend};
use crate::models::SummaryRequest;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Returns the same scripted outcome for every request and counts calls.
pub struct MockBackend {
    name: &'static str,
    outcome: Result<String, BackendError>,
    calls: AtomicUsize,
}

impl MockBackend {
    pub fn succeeding(name: &'static str, text: impl Into<String>) -> Self {
        Self {
            name,
            outcome: Ok(text.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(name: &'static str, error: BackendError) -> Self {
        Self {
            name,
            outcome: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SummaryBackend for MockBackend {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch_summary(&self, _request: &SummaryRequest) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}
