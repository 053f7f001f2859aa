//! Logging setup.
//!
//! Events go to stderr and to a daily-rolling file in the log directory.
//! `RUST_LOG` overrides the default filter.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use time::macros::format_description;
use time::UtcOffset;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, EnvFilter};

/// Log file name prefix; the appender adds the date.
pub const LOG_FILE_PREFIX: &str = "devsuite.log";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to create log directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("a global logger is already installed: {0}")]
    Init(#[from] TryInitError),
}

/// `<local data dir>/devsuite/logs`, falling back to the OS temp directory.
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("devsuite")
        .join("logs")
}

/// Default filter directive for a verbosity flag.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "devsuite=debug"
    } else {
        "devsuite=info"
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer when dropped; keep it alive
/// for the lifetime of the process.
pub fn init_logging(log_dir: &Path, verbose: bool) -> Result<WorkerGuard, LoggingError> {
    std::fs::create_dir_all(log_dir).map_err(|source| LoggingError::CreateDir {
        path: log_dir.to_path_buf(),
        source,
    })?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let timer = OffsetTime::new(
        offset,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"),
    );

    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_timer(timer.clone())
                .with_target(false),
        )
        .with(
            fmt::layer()
                .with_writer(file_writer)
                .with_timer(timer)
                .with_ansi(false),
        )
        .try_init()?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(false), "devsuite=info");
        assert!(default_filter(true).contains("debug"));
    }

    #[test]
    fn test_default_log_dir_is_namespaced() {
        let dir = default_log_dir();
        assert!(dir.ends_with("devsuite/logs"));
    }
}
