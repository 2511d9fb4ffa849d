use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;

use sensebox::config::Config;
use sensebox::{AppState, Registry, build_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sensebox=debug".into()),
        )
        .init();

    let config = Config::parse();
    tracing::info!("Starting sensebox with config: {:?}", config);

    tracing::info!("Loading classifiers from {}", config.models_dir.display());
    let registry = match Registry::load(&config.models_dir) {
        Ok(registry) => registry,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load models");
            return Err(e.into());
        }
    };
    tracing::info!("Models loaded successfully");

    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    let app = build_router(AppState::new(Arc::new(registry)), config.max_upload_bytes)
        .route("/metrics", get(|| async move { metric_handle.render() }))
        .layer(prometheus_layer);

    let listener = TcpListener::bind(&config.server_address()).await?;
    tracing::info!("Server running on http://{}", config.server_address());

    axum::serve(listener, app).await?;
    Ok(())
}
