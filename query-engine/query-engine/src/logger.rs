use crate::{error::JoinEngineError, JoinEngineResult, LogFormat};
use tracing::subscriber;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Layer};

/// Crates whose level `JE_LOG_LEVEL` sets.
const ENGINE_CRATES: [&str; 4] = ["join_engine", "join_core", "request_handlers", "memory_connector"];

/// An installer for a global logger. Logs go to stderr, stdout carries the
/// responses.
#[derive(Debug, Clone)]
pub struct Logger {
    log_format: LogFormat,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// Initialize a new global logger installer.
    pub fn new() -> Self {
        Self {
            log_format: LogFormat::Text,
        }
    }

    /// Sets the log output format. Default: Text.
    pub fn log_format(&mut self, log_format: LogFormat) {
        self.log_format = log_format;
    }

    /// Install logger as a global. Can be called only once per application
    /// instance.
    pub fn install(&self) -> JoinEngineResult<()> {
        let filter = create_env_filter()?;

        let fmt_layer = match self.log_format {
            LogFormat::Text => {
                let fmt_layer = tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_filter(filter);
                fmt_layer.boxed()
            }
            LogFormat::Json => {
                let fmt_layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_filter(filter);
                fmt_layer.boxed()
            }
        };

        let subscriber = tracing_subscriber::registry().with(fmt_layer);
        subscriber::set_global_default(subscriber).map_err(|err| JoinEngineError::LoggerError(err.to_string()))
    }
}

fn create_env_filter() -> JoinEngineResult<EnvFilter> {
    let mut filter = EnvFilter::from_default_env();

    if let Ok(je_log_level) = std::env::var("JE_LOG_LEVEL") {
        for target in ENGINE_CRATES {
            let directive = format!("{}={}", target, &je_log_level)
                .parse()
                .map_err(|err| JoinEngineError::LoggerError(format!("Invalid JE_LOG_LEVEL: {err}")))?;

            filter = filter.add_directive(directive);
        }
    }

    Ok(filter)
}
