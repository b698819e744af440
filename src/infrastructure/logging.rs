use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::LogFormat;

pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl LoggingConfig {
    /// `RUST_LOG` wins over the configured level
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }
}

/// Formatting layer for the configured output format
pub fn fmt_layer<S>(format: &LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
    }
}

/// Console logging only, for short-lived commands
pub fn init_logging(config: &LoggingConfig) {
    tracing_subscriber::registry()
        .with(fmt_layer(&config.format))
        .with(config.env_filter())
        .init();

    tracing::debug!("Logging initialized with level: {}", config.level);
}
