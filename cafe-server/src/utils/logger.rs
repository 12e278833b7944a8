//! Logging Infrastructure
//!
//! Structured logging setup with support for both development and production environments.

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Filter used when neither `RUST_LOG` nor an explicit level is given
pub const DEFAULT_FILTER: &str = "cafe_server=info,tower_http=info";

/// Initialize the global subscriber.
///
/// `RUST_LOG` wins over `log_level`. When `log_dir` exists, output goes to a
/// daily rolling file instead of stdout. Calling this twice is a no-op.
pub fn init_logger(log_level: Option<&str>, json: bool, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.unwrap_or(DEFAULT_FILTER)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    let file_appender = log_dir
        .map(Path::new)
        .filter(|p| p.exists())
        .map(|dir| tracing_appender::rolling::daily(dir, "cafe-server"));

    let result = match (file_appender, json) {
        (Some(appender), true) => builder.json().with_writer(appender).try_init(),
        (Some(appender), false) => builder.with_ansi(false).with_writer(appender).try_init(),
        (None, true) => builder.json().try_init(),
        (None, false) => builder.try_init(),
    };

    if let Err(e) = result {
        tracing::debug!("Logger already initialized: {e}");
    }
}
