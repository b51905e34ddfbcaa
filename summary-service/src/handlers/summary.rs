use axum::{
    extract::State,
    http::HeaderValue,
    response::{IntoResponse, Response},
    Extension, Json,
};
use service_core::error::AppError;
use service_core::middleware::RequestId;
use validator::Validate;

use crate::models::SummaryRequest;
use crate::services::render_outcome;
use crate::startup::AppState;

/// Set on responses whose body is an error description; value is the error kind.
pub const SUMMARY_ERROR_HEADER: &str = "x-summary-error";

/// `POST /generate-summary`
///
/// Always answers 200 with plain text once the body is valid: the summary, or
/// an `Error: ...` line. Only malformed input gets a non-200 status.
#[tracing::instrument(skip_all, fields(request_id))]
pub async fn generate_summary(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    Json(request): Json<SummaryRequest>,
) -> Result<Response, AppError> {
    if let Some(Extension(RequestId(id))) = &request_id {
        tracing::Span::current().record("request_id", id.as_str());
    }

    request.validate()?;

    let result = state.forwarder.generate_summary(&request).await;
    let error_kind = result.as_ref().err().map(|e| e.kind());

    let mut response = render_outcome(result).into_response();
    if let Some(kind) = error_kind {
        response
            .headers_mut()
            .insert(SUMMARY_ERROR_HEADER, HeaderValue::from_static(kind));
    }

    Ok(response)
}
