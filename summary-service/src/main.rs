use service_core::observability::init_tracing;
use summary_service::config::SummaryConfig;
use summary_service::services::metrics::init_metrics;
use summary_service::startup::Application;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Tracing is not up yet, so configuration failures go to stderr.
    let config = SummaryConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing(
        &config.service_name,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    );

    init_metrics().map_err(|e| {
        tracing::error!(error = %e, "Failed to initialize metrics");
        std::io::Error::other(format!("Metrics error: {}", e))
    })?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        backend = %config.backend,
        research_url = %config.research.base_url,
        timeout_secs = config.research.timeout_secs,
        completion_model = %config.completion.model,
        debug = config.common.debug,
        "Configuration loaded"
    );

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to build application");
        std::io::Error::other(format!("Application build error: {}", e))
    })?;

    app.run_until_stopped().await
}
