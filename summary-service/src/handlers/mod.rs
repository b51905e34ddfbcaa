//! HTTP handlers for the summary service.

pub mod health;
pub mod metrics;
pub mod summary;

pub use health::{health_check, not_found, service_info};
pub use summary::{generate_summary, SUMMARY_ERROR_HEADER};
