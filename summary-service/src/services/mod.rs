pub mod backends;
pub mod forwarder;
pub mod metrics;
pub mod prompt;

pub use backends::{BackendError, SummaryBackend};
pub use forwarder::{render_outcome, SummaryForwarder};
