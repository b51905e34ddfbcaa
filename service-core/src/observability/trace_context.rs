//! W3C Trace Context propagation for outbound backend calls.
//!
//! See: https://www.w3.org/TR/trace-context/

use opentelemetry::trace::{SpanContext, TraceContextExt};
use reqwest::RequestBuilder;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

pub const TRACEPARENT_HEADER: &str = "traceparent";
pub const TRACESTATE_HEADER: &str = "tracestate";

/// `traceparent` value for a span context, `None` when the context is invalid.
pub fn traceparent(span_context: &SpanContext) -> Option<String> {
    if !span_context.is_valid() {
        return None;
    }
    // version-trace_id-span_id-trace_flags
    Some(format!(
        "00-{}-{}-{:02x}",
        span_context.trace_id(),
        span_context.span_id(),
        span_context.trace_flags().to_u8()
    ))
}

/// Headers carrying the current span's trace context.
///
/// Empty when the current span has no OpenTelemetry context, which is the
/// case whenever OTLP export is disabled.
pub fn trace_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    let context = Span::current().context();
    let span_ref = context.span();
    let span_context = span_ref.span_context();

    let Some(parent) = traceparent(span_context) else {
        return headers;
    };
    if let Ok(value) = HeaderValue::from_str(&parent) {
        headers.insert(TRACEPARENT_HEADER, value);
    }

    let state = span_context.trace_state().header();
    if !state.is_empty()
        && let Ok(value) = HeaderValue::from_str(&state)
    {
        headers.insert(TRACESTATE_HEADER, value);
    }
    headers
}

/// Attaches trace context headers to an outgoing request.
pub trait PropagateTrace {
    fn propagate_trace(self) -> Self;
}

impl PropagateTrace for RequestBuilder {
    fn propagate_trace(self) -> Self {
        self.headers(trace_headers())
    }
}
