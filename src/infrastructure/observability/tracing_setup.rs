//! OpenTelemetry distributed tracing setup

use opentelemetry::{trace::TracerProvider as _, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    runtime,
    trace::{RandomIdGenerator, Sampler, TracerProvider},
    Resource,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use super::config::TracingConfig;
use crate::infrastructure::logging::{fmt_layer, LoggingConfig};

/// Initialize logging plus, when enabled, OTLP span export
pub fn init_tracing(logging_config: &LoggingConfig, tracing_config: &TracingConfig) {
    let (provider, otel_error) = if tracing_config.enabled {
        match init_otel_tracing(tracing_config) {
            Ok(provider) => (Some(provider), None),
            Err(e) => (None, Some(e)),
        }
    } else {
        (None, None)
    };

    let telemetry_layer = provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer(tracing_config.service_name.clone()))
    });

    tracing_subscriber::registry()
        .with(fmt_layer(&logging_config.format))
        .with(telemetry_layer)
        .with(logging_config.env_filter())
        .init();

    match (provider, otel_error) {
        (Some(provider), _) => {
            opentelemetry::global::set_tracer_provider(provider);
            tracing::info!(
                "Tracing initialized with OpenTelemetry export to {}",
                tracing_config.otlp_endpoint
            );
        }
        (None, Some(e)) => {
            tracing::warn!("Failed to initialize OpenTelemetry: {}. Tracing disabled.", e);
        }
        (None, None) => tracing::info!("Tracing initialized (OpenTelemetry disabled)"),
    }
}

fn sampler(ratio: f64) -> Sampler {
    if ratio.is_nan() {
        Sampler::AlwaysOff
    } else if ratio >= 1.0 {
        Sampler::AlwaysOn
    } else if ratio <= 0.0 {
        Sampler::AlwaysOff
    } else {
        Sampler::TraceIdRatioBased(ratio)
    }
}

fn init_otel_tracing(
    config: &TracingConfig,
) -> Result<TracerProvider, opentelemetry::trace::TraceError> {
    let resource = Resource::new(vec![
        KeyValue::new("service.name", config.service_name.clone()),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
    ]);

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&config.otlp_endpoint)
        .build()?;

    let provider = TracerProvider::builder()
        .with_sampler(sampler(config.sampling_ratio))
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(resource)
        .with_batch_exporter(exporter, runtime::Tokio)
        .build();

    Ok(provider)
}

/// Shutdown tracing and flush pending spans
pub fn shutdown_tracing() {
    opentelemetry::global::shutdown_tracer_provider();
    tracing::info!("Tracing shutdown complete");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampler_from_ratio() {
        assert!(matches!(sampler(1.0), Sampler::AlwaysOn));
        assert!(matches!(sampler(0.0), Sampler::AlwaysOff));
        assert!(matches!(sampler(0.25), Sampler::TraceIdRatioBased(r) if r == 0.25));
        assert!(matches!(sampler(3.0), Sampler::AlwaysOn));
        assert!(matches!(sampler(f64::NAN), Sampler::AlwaysOff));
    }
}
