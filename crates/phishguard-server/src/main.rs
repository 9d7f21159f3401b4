//! PhishGuard Server
//!
//! Loads the word corpus and random-forest model, then serves phishing
//! predictions over HTTP until interrupted.

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info, warn};

use phishguard_server::{create_router, AppState, Cli, ServiceConfig};
use phishguard_telemetry::names;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose);

    info!("Starting PhishGuard prediction service");

    // Load configuration
    let config = ServiceConfig::load(&cli.config, &cli)?;
    info!("Configuration loaded successfully");
    info!("Corpus: {}", config.detector.corpus_path.display());
    info!("Model: {}", config.detector.model_path.display());
    if let Some(schema) = &config.detector.schema_path {
        info!("Schema: {}", schema.display());
    }

    // Initialize metrics
    if let Some(metrics_addr) = &config.metrics_listen {
        init_metrics(metrics_addr.parse()?)?;
    }

    // Load corpus and model; any failure stops startup here
    info!("Loading detector...");
    let state = AppState::from_config(&config)?;
    info!("Detector loaded successfully");

    let addr: SocketAddr = format!("{}:{}", cli.listen, cli.port).parse()?;
    let metrics = state.metrics.clone();
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    // Graceful shutdown handler
    let shutdown = async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    let summary = metrics.snapshot();
    info!(
        requests = summary.total_requests,
        predictions = summary.predictions,
        unsafe_rate = summary.unsafe_rate(),
        failure_rate = summary.failure_rate(),
        avg_latency_us = summary.avg_latency_us(),
        "Request summary"
    );

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
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
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("phishguard=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("phishguard=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Install the Prometheus recorder and its HTTP listener
fn init_metrics(addr: SocketAddr) -> Result<()> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics exporter: {}", e))?;

    metrics::describe_counter!(names::REQUESTS_TOTAL, "Total number of prediction requests");
    metrics::describe_counter!(
        names::PREDICTIONS_TOTAL,
        "Completed predictions by verdict"
    );
    metrics::describe_counter!(names::ERRORS_TOTAL, "Total number of errors by kind");
    metrics::describe_histogram!(
        names::PREDICT_LATENCY_US,
        metrics::Unit::Microseconds,
        "Feature extraction and scoring latency in microseconds"
    );

    info!("Metrics exporter listening on http://{}/metrics", addr);
    Ok(())
}
