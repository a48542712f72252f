use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use time::UtcOffset;
use time::macros::format_description;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{self, EnvFilter, fmt, prelude::*};

const LOG_RETENTION_DAYS: u64 = 7;

/// Get the session log directory in the user-specific OS cache directory
/// - Linux: ~/.cache/buffer-words/
/// - macOS: ~/Library/Caches/buffer-words/
/// - Windows: %LOCALAPPDATA%\buffer-words\
pub fn get_log_dir() -> io::Result<PathBuf> {
    let mut log_dir = dirs::cache_dir().ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "Unable to determine user cache directory")
    })?;
    log_dir.push("buffer-words");

    if !log_dir.exists() {
        fs::create_dir_all(&log_dir)?;
    }

    Ok(log_dir)
}

/// Path of a fresh session log, after removing session logs older than
/// LOG_RETENTION_DAYS
pub fn session_log_path() -> io::Result<PathBuf> {
    let log_dir = get_log_dir()?;
    cleanup_old_logs(&log_dir);

    let timestamp = time::OffsetDateTime::now_utc()
        .format(format_description!("[year][month][day]-[hour][minute][second]"))
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    Ok(log_dir.join(format!("session-{}-{}.log", timestamp, std::process::id())))
}

fn cleanup_old_logs(log_dir: &Path) {
    let now = std::time::SystemTime::now();
    let retention = std::time::Duration::from_secs(LOG_RETENTION_DAYS * 24 * 60 * 60);

    let Ok(entries) = fs::read_dir(log_dir) else {
        return;
    };

    for entry in entries.flatten() {
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        let is_session_log = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with("session-") && name.ends_with(".log"));
        if !metadata.is_file() || !is_session_log {
            continue;
        }

        let expired = metadata
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .is_some_and(|age| age > retention);
        if expired {
            if let Err(e) = fs::remove_file(entry.path()) {
                eprintln!("Failed to remove old log file {:?}: {}", entry.path(), e);
            }
        }
    }
}

/// Initialize logging to stderr and, optionally, to a file.
/// Returns a WorkerGuard that must be kept alive for the duration of the program.
///
/// # Arguments
/// * `no_color` - Disable ANSI colors in stderr output
/// * `log_level` - Override log level (otherwise uses RUST_LOG or defaults to "info")
/// * `log_file` - Append a DEBUG level log to this file
pub fn init_logger(
    no_color: bool,
    log_level: Option<&str>,
    log_file: Option<&Path>,
) -> io::Result<WorkerGuard> {
    let timer = fmt::time::OffsetTime::new(
        UtcOffset::UTC,
        format_description!("[[[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z]"),
    );

    let stderr_filter = match log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(timer.clone())
        .with_ansi(!no_color)
        .with_filter(stderr_filter);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file = fs::OpenOptions::new().create(true).append(true).open(path)?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_timer(timer)
                .with_ansi(false)
                .with_filter(EnvFilter::new("debug"));
            (Some(layer), guard)
        }
        None => {
            let (_, guard) = tracing_appender::non_blocking(std::io::sink());
            (None, guard)
        }
    };

    let result = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    match result {
        Ok(()) => {
            if let Some(path) = log_file {
                eprintln!("Logging to file: {:?}", path);
            }
            Ok(guard)
        }
        // Ignore errors due to the subscriber already being set (tests)
        Err(e) if e.to_string().contains("already been set") || e.to_string().contains("already initialized") => {
            Ok(guard)
        }
        Err(e) => Err(io::Error::new(io::ErrorKind::Other, e)),
    }
}
