//! File-backed tracing setup.
//!
//! The console owns the terminal's alternate screen, so log output goes to
//! the configured file instead of stderr. The returned guard must stay
//! alive for the duration of the process or buffered lines are lost.

use crate::error::TuiError;
use std::ffi::OsStr;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub fn init(log_path: &Path) -> Result<WorkerGuard, TuiError> {
    let directory = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(directory)?;
    let file_name = log_path
        .file_name()
        .unwrap_or_else(|| OsStr::new("fidus-tui.log"));

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| TuiError::Logging(e.to_string()))?;

    Ok(guard)
}
