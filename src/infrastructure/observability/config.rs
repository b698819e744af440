//! Observability configuration (`[observability]` section)

use serde::Deserialize;

/// Upper bounds, in seconds, of the text-analysis latency histogram.
/// Scoring reloads the model artifact, so the range reaches into seconds.
pub const DEFAULT_ANALYSIS_BUCKETS: [f64; 10] =
    [0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub tracing: TracingConfig,
    pub metrics: MetricsConfig,
}

/// OTLP span export
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    pub enabled: bool,
    pub otlp_endpoint: String,
    pub service_name: String,
    /// Fraction of traces kept, clamped to `[0, 1]` when the sampler is built
    pub sampling_ratio: f64,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            otlp_endpoint: "http://localhost:4317".to_string(),
            service_name: env!("CARGO_PKG_NAME").to_string(),
            sampling_ratio: 1.0,
        }
    }
}

/// Prometheus exposition
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub path: String,
    pub analysis_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
            analysis_buckets: DEFAULT_ANALYSIS_BUCKETS.to_vec(),
        }
    }
}

impl MetricsConfig {
    /// The configured path as a router path, always rooted
    pub fn route(&self) -> String {
        let trimmed = self.path.trim().trim_start_matches('/');
        if trimmed.is_empty() {
            "/metrics".to_string()
        } else {
            format!("/{}", trimmed)
        }
    }
}
