//! Logger initialization using `tracing`.

use super::config::{LogConfig, LogFormat, RotationPolicy};
use anyhow::Result;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Holds the non-blocking writer guard; dropping it flushes pending logs.
pub struct LoggerImpl {
    _guard: Option<WorkerGuard>,
}

impl LoggerImpl {
    pub fn init(config: &LogConfig) -> Result<Self> {
        let default_level = parse_log_level(&config.level)?;
        let env_filter = EnvFilter::builder()
            .with_default_directive(default_level.into())
            .from_env_lossy();

        let (file_layer, guard) = if let Some(ref log_dir) = config.log_dir {
            let appender = match config.rotation {
                RotationPolicy::Daily => rolling::daily(log_dir, "cadence.log"),
                RotationPolicy::Hourly => rolling::hourly(log_dir, "cadence.log"),
                RotationPolicy::Never => rolling::never(log_dir, "cadence.log"),
            };
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true)
                .boxed();
            (Some(layer), Some(guard))
        } else {
            (None, None)
        };

        let stdout_layer = if config.enable_stdout {
            let layer = match config.format {
                LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
                LogFormat::Pretty => tracing_subscriber::fmt::layer().pretty().boxed(),
            };
            Some(layer)
        } else {
            None
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .with(stdout_layer)
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

        Ok(Self { _guard: guard })
    }
}

fn parse_log_level(level: &str) -> Result<Level> {
    level
        .parse::<Level>()
        .map_err(|_| anyhow::anyhow!("invalid log level: {level}"))
}
