//! Tracing configuration and initialization.
//!
//! Provides structured logging with span-based context propagation.

use server_config::{LogFormat, LogLevel, LoggingSection};
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Configuration for tracing initialization.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Service name for identification
    pub service_name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: Level,
    /// Whether to output in JSON format
    pub json_output: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            service_name: server_config::DEFAULT_SERVER_NAME.to_string(),
            log_level: Level::INFO,
            json_output: false,
        }
    }
}

impl TracingConfig {
    /// Create a new config with the given service name.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    /// Build a config from the `LOG_LEVEL` / `LOG_FORMAT` settings.
    pub fn from_logging(service_name: impl Into<String>, logging: &LoggingSection) -> Self {
        Self::new(service_name)
            .with_level(level_for(logging.level))
            .with_json(logging.format == LogFormat::Json)
    }

    /// Set the log level.
    pub fn with_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }

    /// Enable JSON output format.
    pub fn with_json(mut self, json: bool) -> Self {
        self.json_output = json;
        self
    }

    /// `RUST_LOG` wins over the configured level when it is set.
    fn build_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("{}", self.log_level)))
    }
}

pub fn level_for(level: LogLevel) -> Level {
    match level {
        LogLevel::Trace => Level::TRACE,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Info => Level::INFO,
        LogLevel::Warn => Level::WARN,
        LogLevel::Error => Level::ERROR,
    }
}

/// Initialize tracing with the given configuration.
///
/// This should be called once at application startup.
///
/// # Example
///
/// ```no_run
/// use observability::{init_tracing, TracingConfig};
/// use tracing::Level;
///
/// init_tracing(TracingConfig::new("k8s-mcp-server").with_level(Level::DEBUG));
/// ```
pub fn init_tracing(config: TracingConfig) {
    let filter = config.build_filter();

    if config.json_output {
        let fmt_layer = fmt::layer().json().with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    } else {
        let fmt_layer = fmt::layer().with_writer(std::io::stderr).with_ansi(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }

    tracing::debug!(
        service = %config.service_name,
        level = %config.log_level,
        json = config.json_output,
        "Tracing initialized"
    );
}

/// Create a span for a single tool invocation.
#[macro_export]
macro_rules! tool_span {
    ($tool:expr) => {
        tracing::info_span!("tool_call", tool = %$tool)
    };
    ($tool:expr, $($field:tt)*) => {
        tracing::info_span!("tool_call", tool = %$tool, $($field)*)
    };
}
