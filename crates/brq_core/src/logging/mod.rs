//! Logging infrastructure for Batch Render Queue.
//!
//! This module provides:
//! - Per-run loggers with file + callback dual output
//! - Indentation levels for nested entry/frame blocks
//! - Integration with the `tracing` ecosystem, including an optional rolling
//!   file layer for long-lived sessions
//!
//! # Example
//!
//! ```no_run
//! use brq_core::logging::{LogConfig, RunLogger};
//!
//! // Create a run logger
//! let logger = RunLogger::new(
//!     "24-06-18T14.18.45",
//!     "/path/to/logs",
//!     LogConfig::default(),
//!     None,
//! ).unwrap();
//!
//! // Log messages at various levels
//! logger.phase("Pre-check");
//! logger.info("Checking: [0] Cam01");
//! logger.indent();
//! logger.info("Output path: /renders/Cam01_0001_24-06-18T14.18.45.exr");
//! logger.dedent();
//! logger.success("No errors found!");
//! ```

mod run_logger;
mod types;

pub use run_logger::{RunLogger, RunLoggerBuilder};
pub use types::{LogConfig, LogLevel, MessagePrefix, RunLogCallback};

use std::path::Path;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize global tracing subscriber for application-wide logging.
///
/// This sets up a subscriber that:
/// - Respects RUST_LOG environment variable
/// - Falls back to the provided default level
/// - Outputs to stderr with timestamps
///
/// Should be called once at application startup.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_to_filter_str(default_level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();
}

/// Initialize tracing with an additional daily-rolling file layer.
///
/// Alternative to [`init_tracing`] for sessions that should leave a
/// persistent diagnostic trail. The returned guard must be kept alive for
/// the duration of the program; dropping it stops the background writer.
pub fn init_tracing_to_file(
    default_level: LogLevel,
    log_dir: impl AsRef<Path>,
) -> tracing_appender::non_blocking::WorkerGuard {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_to_filter_str(default_level)));

    let appender = tracing_appender::rolling::daily(log_dir.as_ref(), "batch_render.log");
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .with(filter)
        .init();

    guard
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

/// Convert LogLevel to filter string.
fn level_to_filter_str(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => "trace",
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    }
}
