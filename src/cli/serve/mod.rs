//! Serve command - runs the HTTP API

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use crate::api::{create_router_with_metrics, AppState};
use crate::config::AppConfig;
use crate::infrastructure::analysis::EnglishPreprocessor;
use crate::infrastructure::lda::ArtifactTopicScorer;
use crate::infrastructure::logging::LoggingConfig;
use crate::infrastructure::observability::{init_metrics, init_tracing, shutdown_tracing};

pub async fn run() -> anyhow::Result<()> {
    let config = super::load_config()?;
    init_tracing(
        &LoggingConfig {
            level: config.logging.level.clone(),
            format: config.logging.format.clone(),
        },
        &config.observability.tracing,
    );

    let store = super::open_store(&config).await?;
    let state = AppState::from_store(
        store,
        Arc::new(EnglishPreprocessor::new(config.topics.minimum_words_per_text)),
        Arc::new(ArtifactTopicScorer::new()),
        config.topics.query_config(),
        config.topics.top_n_document_topics,
    );

    let metrics = init_metrics(&config.observability.metrics);
    let app = create_router_with_metrics(state, metrics, &config.observability.metrics.route());

    let addr = build_socket_addr(&config)?;
    info!("Starting Topic Evolution API on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown_tracing();
    info!("Server shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

fn build_socket_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_socket_addr() {
        let mut config = AppConfig::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 9000;

        assert_eq!(
            build_socket_addr(&config).unwrap(),
            "127.0.0.1:9000".parse::<SocketAddr>().unwrap()
        );

        config.server.host = "not-an-ip".to_string();
        assert!(build_socket_addr(&config).is_err());
    }
}
