//! Application startup and lifecycle management.

use crate::config::{BackendKind, CorsConfig, SummaryConfig};
use crate::handlers::{generate_summary, health_check, metrics::metrics, not_found, service_info};
use crate::services::backends::{
    CompletionBackend, DirectSummarizeBackend, FallbackBackend, ResearchReportBackend,
};
use crate::services::{SummaryBackend, SummaryForwarder};
use axum::{
    http::{HeaderValue, Request},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware, REQUEST_ID_HEADER};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: SummaryForwarder,
    pub backend: BackendKind,
}

/// Construct the configured backend strategy.
///
/// Fails when the research backend is selected without a completion
/// credential, so the process never starts serving half-configured.
pub fn build_backend(config: &SummaryConfig) -> Result<Arc<dyn SummaryBackend>, AppError> {
    let backend: Arc<dyn SummaryBackend> = match config.backend {
        BackendKind::Direct => {
            Arc::new(DirectSummarizeBackend::new(&config.research).map_err(config_error)?)
        }
        BackendKind::Research => {
            let primary = ResearchReportBackend::new(&config.research).map_err(config_error)?;
            let fallback = CompletionBackend::new(&config.completion).map_err(config_error)?;
            tracing::info!(model = %fallback.model(), "Initialized completion fallback");
            Arc::new(FallbackBackend::new(Arc::new(primary), Arc::new(fallback)))
        }
    };

    tracing::info!(
        backend = %config.backend,
        base_url = %config.research.base_url,
        timeout_secs = config.research.timeout_secs,
        "Initialized summary backend"
    );

    Ok(backend)
}

fn config_error(err: impl std::fmt::Display) -> AppError {
    AppError::ConfigError(anyhow::anyhow!("{}", err))
}

fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    // Credentials rule out wildcards, so methods and headers are mirrored instead.
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

pub fn build_router(state: AppState, cors: &CorsConfig) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/generate-summary", post(generate_summary))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .fallback(not_found)
        .layer(from_fn(metrics_middleware))
        .layer(cors_layer(cors))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: SummaryConfig) -> Result<Self, AppError> {
        let backend = build_backend(&config)?;
        Self::build_with_backend(config, backend).await
    }

    /// Build around an already constructed backend.
    pub async fn build_with_backend(
        config: SummaryConfig,
        backend: Arc<dyn SummaryBackend>,
    ) -> Result<Self, AppError> {
        let state = AppState {
            forwarder: SummaryForwarder::new(backend),
            backend: config.backend,
        };
        let router = build_router(state, &config.cors);

        // Port 0 = random port for testing
        let address = config.common.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Summary service listening on {}:{}", config.common.host, port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until Ctrl+C or SIGTERM.
    ///
    /// In-flight downstream calls are not cancelled when their client goes
    /// away; the graceful shutdown waits for them.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                e
            })
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
