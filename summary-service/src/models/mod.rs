//! Domain models for the summary service.

pub mod summary;

pub use summary::{extract_report, extract_summary, ExtractedText, SummaryRequest};
