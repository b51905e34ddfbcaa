use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use service_core::error::AppError;

use crate::startup::AppState;

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "summary-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Static description of the API for humans poking at the root URL.
pub async fn service_info(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "message": "Book Summary API with deep research",
        "endpoint": "POST /generate-summary",
        "parameters": ["book_name", "author", "publication_date"],
        "response": "Text only - comprehensive book analysis",
        "backend": state.backend.as_str(),
    }))
}

pub async fn not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("route not found"))
}
