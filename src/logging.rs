//! Structured JSONL logging plus human-readable stderr output.
//!
//! Dual-output logging:
//! - **JSONL to file** (`~/.script-panel/logs/script-panel.jsonl`) - structured, greppable
//! - **Pretty to stderr** - human-readable for developers
//!
//! ```rust,ignore
//! use script_panel::logging;
//!
//! // MUST keep the guard alive for the duration of the program
//! let _guard = logging::init();
//!
//! tracing::info!(script_count = 12, "registry populated");
//! ```

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Guard that must be kept alive for the duration of the program.
/// Dropping it flushes and closes the log file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialize the dual-output logging system.
///
/// Returns a guard that MUST be kept alive for the duration of the
/// program; dropping it flushes remaining logs.
pub fn init() -> LoggingGuard {
    let log_dir = get_log_dir();
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("[logging] failed to create log directory: {e}");
    }

    let log_path = log_dir.join("script-panel.jsonl");

    let writer: Box<dyn Write + Send> = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => Box::new(file),
        Err(e) => {
            eprintln!("[logging] failed to open log file, file logging disabled: {e}");
            Box::new(std::io::sink())
        }
    };

    // non-blocking writer so panel interactions never stall on disk
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(writer);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // JSONL layer for the file
    let json_layer = fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE);

    // pretty layer for stderr
    let pretty_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .init();

    tracing::info!(log_path = %log_path.display(), "logging initialized");

    LoggingGuard {
        _file_guard: file_guard,
    }
}

/// Log directory (`~/.script-panel/logs/`), temp-dir fallback when no home
/// directory is available.
fn get_log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".script-panel").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("script-panel-logs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_dir_ends_with_logs() {
        let dir = get_log_dir();
        assert!(dir.ends_with("logs") || dir.ends_with("script-panel-logs"));
    }
}
