//! Common test utilities for summary-service integration tests.

#![allow(dead_code)]

use secrecy::Secret;
use serde_json::Value;
use service_core::config::Config as CommonConfig;
use std::sync::{Arc, Once};
use std::time::Duration;
use summary_service::config::{
    BackendKind, CompletionConfig, CorsConfig, ResearchConfig, SummaryConfig,
};
use summary_service::services::SummaryBackend;
use summary_service::startup::Application;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,summary_service=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Configuration pointing both downstreams at `backend_url` (usually a wiremock server).
pub fn test_config(backend: BackendKind, backend_url: &str) -> SummaryConfig {
    SummaryConfig {
        common: CommonConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            debug: true,
        },
        service_name: "summary-service-test".to_string(),
        log_level: "debug".to_string(),
        otlp_endpoint: None,
        backend,
        research: ResearchConfig {
            base_url: backend_url.to_string(),
            timeout_secs: 5,
            report_type: "research_report".to_string(),
        },
        completion: CompletionConfig {
            api_key: Some(Secret::new("sk-test".to_string())),
            api_base: format!("{}/v1", backend_url),
            model: "gpt-4o".to_string(),
            temperature: 0.7,
            max_tokens: 1500,
            timeout_secs: 5,
        },
        cors: CorsConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
    }
}

/// Test application wrapper.
pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn post_summary(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}/generate-summary", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to send request")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to send request")
    }
}

/// Spawn the application built from `config` on a random port.
pub async fn spawn_app(config: SummaryConfig) -> TestApp {
    init_tracing();

    let app = Application::build(config)
        .await
        .expect("Failed to build application");
    serve(app)
}

/// Spawn the application around a hand-built backend.
pub async fn spawn_app_with_backend(backend: Arc<dyn SummaryBackend>) -> TestApp {
    init_tracing();

    let config = test_config(BackendKind::Direct, "http://127.0.0.1:1");
    let app = Application::build_with_backend(config, backend)
        .await
        .expect("Failed to build application");
    serve(app)
}

fn serve(app: Application) -> TestApp {
    let address = format!("http://127.0.0.1:{}", app.port());

    // The listener is already bound, so requests queue until the server task runs.
    tokio::spawn(async move {
        app.run_until_stopped().await.ok();
    });

    TestApp {
        address,
        client: reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build client"),
    }
}

pub fn book() -> Value {
    serde_json::json!({
        "book_name": "Moby-Dick",
        "author": "Herman Melville",
        "publication_date": "1851",
    })
}
