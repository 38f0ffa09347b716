//! Tracing setup for adapter binaries.
//!
//! stdout carries the protocol, so human-readable logs go to stderr. When
//! `COURIER_LOG_DIR` is set, a daily-rolling JSON log is written there too.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::error::{McpError, Result};

/// Env var overriding the log filter.
pub const LOG_FILTER_ENV: &str = "COURIER_LOG";

/// Env var naming a directory for JSON log files.
pub const LOG_DIR_ENV: &str = "COURIER_LOG_DIR";

/// Keeps the file writer alive; drop it only at process exit.
#[must_use = "dropping the guard stops the log file writer"]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber.
///
/// `file_prefix` names the rolling log file; `default_filter` applies when
/// `COURIER_LOG` is unset.
pub fn init_tracing(file_prefix: &str, default_filter: &str) -> Result<LogGuard> {
    let filter = std::env::var(LOG_FILTER_ENV).unwrap_or_else(|_| default_filter.to_string());
    let console_filter = EnvFilter::try_new(&filter)
        .map_err(|e| McpError::logging(format!("invalid {} '{}': {}", LOG_FILTER_ENV, filter, e)))?;

    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .with_filter(console_filter);

    let log_dir = std::env::var(LOG_DIR_ENV)
        .ok()
        .filter(|d| !d.is_empty())
        .map(PathBuf::from);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let file_appender =
                tracing_appender::rolling::daily(&dir, format!("{}.log", file_prefix));
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let file_filter = EnvFilter::try_new(&filter).map_err(|e| {
                McpError::logging(format!("invalid {} '{}': {}", LOG_FILTER_ENV, filter, e))
            })?;
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(file_filter);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| McpError::logging(e.to_string()))?;

    Ok(LogGuard { _file: guard })
}
