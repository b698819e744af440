use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::health;
use super::middleware::{logging_middleware, metrics_middleware};
use super::state::AppState;
use super::v1;
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

/// Create the full router with application state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .nest("/v1", v1::create_v1_router())
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}

/// The full router plus the Prometheus endpoint when metrics are enabled
pub fn create_router_with_metrics(
    state: AppState,
    metrics: Option<PrometheusMetrics>,
    metrics_path: &str,
) -> Router {
    let router = create_router(state);

    match metrics {
        Some(metrics) => router.merge(create_metrics_router(metrics, metrics_path)),
        None => router,
    }
}
