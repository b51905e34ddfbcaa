//! Integration tests for the plain summarizer backend (`SUMMARY_BACKEND=direct`).

mod common;

use common::{book, spawn_app, test_config};
use serde_json::json;
use std::time::Duration;
use summary_service::config::BackendKind;
use summary_service::handlers::SUMMARY_ERROR_HEADER;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn returns_summary_field_verbatim() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/summarize"))
        .and(body_json(json!({
            "name": "Moby-Dick",
            "author": "Herman Melville",
            "publication_date": "1851",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "summary": "X" })))
        .expect(1)
        .mount(&backend)
        .await;

    let app = spawn_app(test_config(BackendKind::Direct, &backend.uri())).await;
    let response = app.post_summary(&book()).await;

    assert_eq!(response.status(), 200);
    assert!(response.headers().get(SUMMARY_ERROR_HEADER).is_none());
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    assert_eq!(response.text().await.unwrap(), "X");
}

#[tokio::test]
async fn missing_summary_field_returns_raw_body() {
    let backend = MockServer::start().await;
    let raw = r#"{"report":"long report","sources":[]}"#;
    Mock::given(method("POST"))
        .and(path("/summarize"))
        .respond_with(ResponseTemplate::new(200).set_body_string(raw))
        .mount(&backend)
        .await;

    let app = spawn_app(test_config(BackendKind::Direct, &backend.uri())).await;
    let response = app.post_summary(&book()).await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), raw);
}

#[tokio::test]
async fn server_error_is_reported_with_status_code() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/summarize"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&backend)
        .await;

    let app = spawn_app(test_config(BackendKind::Direct, &backend.uri())).await;
    let response = app.post_summary(&book()).await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()[SUMMARY_ERROR_HEADER], "status");
    let body = response.text().await.unwrap();
    assert!(body.starts_with("Error: "));
    assert!(body.contains("500"));
}

#[tokio::test]
async fn unreachable_backend_returns_connection_error() {
    let app = spawn_app(test_config(BackendKind::Direct, "http://127.0.0.1:1")).await;
    let response = app.post_summary(&book()).await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()[SUMMARY_ERROR_HEADER], "connect");
    assert_eq!(
        response.text().await.unwrap(),
        "Error: could not connect to the research backend at http://127.0.0.1:1/summarize"
    );
}

#[tokio::test]
async fn empty_summary_is_reported_not_passed_through() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/summarize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "summary": "" })))
        .expect(1)
        .mount(&backend)
        .await;

    let app = spawn_app(test_config(BackendKind::Direct, &backend.uri())).await;
    let response = app.post_summary(&book()).await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()[SUMMARY_ERROR_HEADER], "empty");
    assert_eq!(
        response.text().await.unwrap(),
        "Error: the research backend returned an empty summary"
    );
}

#[tokio::test]
async fn slow_backend_returns_timeout_error() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/summarize"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "summary": "too late" }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&backend)
        .await;

    let mut config = test_config(BackendKind::Direct, &backend.uri());
    config.research.timeout_secs = 1;
    let app = spawn_app(config).await;

    let response = app.post_summary(&book()).await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()[SUMMARY_ERROR_HEADER], "timeout");
    assert_eq!(
        response.text().await.unwrap(),
        "Error: request to the research backend timed out after 1 second"
    );
}

#[tokio::test]
async fn non_json_success_body_is_reported() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/summarize"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&backend)
        .await;

    let app = spawn_app(test_config(BackendKind::Direct, &backend.uri())).await;
    let response = app.post_summary(&book()).await;

    assert_eq!(response.headers()[SUMMARY_ERROR_HEADER], "malformed");
    assert!(response
        .text()
        .await
        .unwrap()
        .starts_with("Error: the research backend returned an unreadable response"));
}

#[tokio::test]
async fn identical_requests_get_identical_answers() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/summarize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "summary": "Call me Ishmael." })))
        .expect(2)
        .mount(&backend)
        .await;

    let app = spawn_app(test_config(BackendKind::Direct, &backend.uri())).await;
    let first = app.post_summary(&book()).await.text().await.unwrap();
    let second = app.post_summary(&book()).await.text().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first, "Call me Ishmael.");
}

#[tokio::test]
async fn empty_field_is_rejected_without_calling_backend() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "summary": "X" })))
        .expect(0)
        .mount(&backend)
        .await;

    let app = spawn_app(test_config(BackendKind::Direct, &backend.uri())).await;
    let response = app
        .post_summary(&json!({
            "book_name": "",
            "author": "Herman Melville",
            "publication_date": "1851",
        }))
        .await;

    assert_eq!(response.status(), 422);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Validation error");
}

#[tokio::test]
async fn missing_field_is_rejected() {
    let app = spawn_app(test_config(BackendKind::Direct, "http://127.0.0.1:1")).await;
    let response = app
        .post_summary(&json!({ "book_name": "Moby-Dick", "author": "Herman Melville" }))
        .await;

    assert_eq!(response.status(), 422);
}
