use tracing_appender::non_blocking::NonBlocking;
use tracing_subscriber::{fmt::time::UtcTime, layer::Identity, prelude::*, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};

/// Initialize logging: stdout plus an optional rolling file appender.
///
/// Filter precedence: `logging.level` from config, then `RUST_LOG`, then "info".
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_with_config(cfg: &LoggingConfig) {
    let env_filter = match &cfg.level {
        Some(level) => EnvFilter::new(level.as_str()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    match cfg.format {
        LogFormat::Json => {
            let stdout = tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_timer(UtcTime::rfc_3339())
                .with_writer(std::io::stdout);
            let file = build_file_layer(cfg, |writer| {
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_timer(UtcTime::rfc_3339())
                    .with_writer(writer)
            });
            let registry = tracing_subscriber::registry().with(env_filter).with(stdout);
            match file {
                Some(file) => {
                    let _ = registry.with(file).try_init();
                }
                None => {
                    let _ = registry.with(Identity::new()).try_init();
                }
            }
        }
        LogFormat::Text => {
            let stdout = tracing_subscriber::fmt::layer()
                .with_ansi(true)
                .with_timer(UtcTime::rfc_3339())
                .with_writer(std::io::stdout);
            let file = build_file_layer(cfg, |writer| {
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_timer(UtcTime::rfc_3339())
                    .with_writer(writer)
            });
            let registry = tracing_subscriber::registry().with(env_filter).with(stdout);
            match file {
                Some(file) => {
                    let _ = registry.with(file).try_init();
                }
                None => {
                    let _ = registry.with(Identity::new()).try_init();
                }
            }
        }
    }
}

fn build_file_layer<F, L>(cfg: &LoggingConfig, build_layer: F) -> Option<L>
where
    F: FnOnce(NonBlocking) -> L,
{
    if !cfg.enable_file_logging {
        return None;
    }

    let rotation = match cfg.rotation.to_lowercase().as_str() {
        "hourly" => tracing_appender::rolling::Rotation::HOURLY,
        "never" => tracing_appender::rolling::Rotation::NEVER,
        _ => tracing_appender::rolling::Rotation::DAILY,
    };

    if let Err(err) = std::fs::create_dir_all(&cfg.dir) {
        eprintln!(
            "Failed to create log directory '{}' ({err}), continuing with stdout logs",
            cfg.dir
        );
        return None;
    }

    let file_appender =
        tracing_appender::rolling::RollingFileAppender::new(rotation, &cfg.dir, &cfg.filename);
    let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);

    // The guard flushes on drop; keep it for the process lifetime.
    let _leaked: &'static _ = Box::leak(Box::new(file_guard));

    Some(build_layer(non_blocking))
}
