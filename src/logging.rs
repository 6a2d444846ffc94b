//! Logging infrastructure for promptdeck.
//!
//! Structured file logging with daily rotation to platform-standard directories.
//! The terminal belongs to the UI, so nothing is written to stdout or stderr.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use directories::ProjectDirs;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;

const LOG_FILE_PREFIX: &str = "promptdeck";
const RETENTION_DAYS: u64 = 7;

/// Result of initializing the logging system.
pub struct LoggingContext {
    /// Guard that must be held for the application lifetime to ensure logs are flushed.
    pub _guard: WorkerGuard,
    pub session_id: String,
    pub log_directory: PathBuf,
}

/// Error that occurred during logging initialization.
#[derive(Debug)]
pub struct LoggingError {
    pub message: String,
}

impl std::fmt::Display for LoggingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for LoggingError {}

/// Generates a 6-character random hex session ID.
fn generate_session_id() -> String {
    use rand::Rng;
    let mut rng = rand::rng();
    let bytes: [u8; 3] = rng.random();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Initializes the logging system.
///
/// `default_level` is used when `RUST_LOG` is unset or invalid.
/// The returned `WorkerGuard` must be held for the application lifetime.
pub fn init(default_level: &str) -> Result<LoggingContext, LoggingError> {
    let session_id = generate_session_id();
    let log_dir = log_directory()?;

    fs::create_dir_all(&log_dir).map_err(|e| LoggingError {
        message: format!("Failed to create log directory: {}", e),
    })?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_span_events(FmtSpan::NONE)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    info!(session_id = %session_id, version = env!("CARGO_PKG_VERSION"), "session_start");

    Ok(LoggingContext {
        _guard: guard,
        session_id,
        log_directory: log_dir,
    })
}

// macOS: ~/Library/Logs/promptdeck/
// Linux: ~/.local/state/promptdeck/
// Windows: %LocalAppData%\promptdeck\
fn log_directory() -> Result<PathBuf, LoggingError> {
    let dir = if cfg!(target_os = "macos") {
        dirs::home_dir().map(|home| home.join("Library").join("Logs").join(LOG_FILE_PREFIX))
    } else {
        ProjectDirs::from("dev", "promptdeck", "promptdeck").and_then(|dirs| {
            dirs.state_dir()
                .map(PathBuf::from)
                .or_else(|| Some(dirs.data_local_dir().join("logs")))
        })
    };
    dir.ok_or_else(|| LoggingError {
        message: "Failed to determine log directory".to_string(),
    })
}

fn is_rotated_log(name: &str) -> bool {
    name.strip_prefix(LOG_FILE_PREFIX)
        .and_then(|rest| rest.strip_prefix('.'))
        .is_some_and(|suffix| !suffix.is_empty())
}

/// Deletes `promptdeck.*` log files older than the retention period.
///
/// Errors are logged at WARN level but don't prevent app startup.
pub fn cleanup_old_logs(log_dir: &Path) -> u32 {
    cleanup_logs_older_than(log_dir, Duration::from_secs(RETENTION_DAYS * 24 * 60 * 60))
}

fn cleanup_logs_older_than(log_dir: &Path, retention: Duration) -> u32 {
    let entries = match fs::read_dir(log_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "log_cleanup_read_dir_failed");
            return 0;
        }
    };

    let now = SystemTime::now();
    let mut deleted_count = 0u32;

    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();

        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) if is_rotated_log(name) => name.to_string(),
            _ => continue,
        };

        let modified = match fs::metadata(&path).and_then(|m| m.modified()) {
            Ok(t) => t,
            Err(e) => {
                warn!(file = %file_name, error = %e, "log_cleanup_metadata_failed");
                continue;
            }
        };

        // Modified in the future: leave it alone.
        let Ok(age) = now.duration_since(modified) else {
            continue;
        };

        if age > retention {
            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!(file = %file_name, age_days = age.as_secs() / 86400, "log_file_deleted");
                    deleted_count += 1;
                }
                Err(e) => {
                    warn!(file = %file_name, error = %e, "log_file_delete_failed");
                }
            }
        }
    }

    if deleted_count > 0 {
        debug!(count = deleted_count, "log_cleanup_completed");
    }
    deleted_count
}
