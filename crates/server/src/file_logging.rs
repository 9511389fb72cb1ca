//! Console and optional file logging.
//!
//! Console output is always on. File logging writes daily-rotated JSON
//! files next to console output.
//!
//! # Configuration
//!
//! - `TILES_FILE_LOGGING`: `true` or `1` enables file logging
//! - `TILES_LOG_DIR`: log directory (defaults to `{asset_dir}/logs`)
//! - `TILES_LOG_MAX_FILES`: number of daily files to keep (default: 7)
//!
//! ```json
//! {"timestamp":"2025-06-01T10:30:00Z","level":"INFO","target":"server","fields":{"message":"..."}}
//! ```

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};
use utils::assets::log_dir;

const LOG_FILE_PREFIX: &str = "task-tiles.log";
const DEFAULT_MAX_FILES: usize = 7;

#[derive(Debug, Clone)]
pub struct FileLoggingConfig {
    pub enabled: bool,
    pub log_dir: PathBuf,
    /// Number of daily log files to retain.
    pub max_files: usize,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        let enabled = std::env::var("TILES_FILE_LOGGING")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let log_dir = std::env::var("TILES_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| log_dir());

        let max_files = std::env::var("TILES_LOG_MAX_FILES")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_MAX_FILES);

        Self {
            enabled,
            log_dir,
            max_files,
        }
    }
}

/// Filter for our crates at `log_level`; everything else logs warnings.
/// A full `RUST_LOG` directive list is used as-is.
fn filter_directives(log_level: &str) -> String {
    if log_level.contains('=') || log_level.contains(',') {
        return log_level.to_string();
    }
    format!(
        "warn,server={level},services={level},db={level},deployment={level},local_deployment={level},utils={level},tower_http={level}",
        level = log_level
    )
}

fn env_filter(directives: &str) -> EnvFilter {
    EnvFilter::try_new(directives).unwrap_or_else(|e| {
        eprintln!("Invalid log filter {directives:?} ({e}), falling back to info");
        EnvFilter::new(filter_directives("info"))
    })
}

/// Initialize logging. Hold the returned guard for the life of the process
/// so buffered file output is flushed; `None` when file logging is off.
pub fn init_logging(log_level: &str) -> Option<WorkerGuard> {
    let config = FileLoggingConfig::default();
    let directives = filter_directives(log_level);

    let console_layer = tracing_subscriber::fmt::layer().with_filter(env_filter(&directives));

    if !config.enabled {
        tracing_subscriber::registry().with(console_layer).init();
        return None;
    }

    if let Err(e) = std::fs::create_dir_all(&config.log_dir) {
        eprintln!("Failed to create log directory {:?}: {}", config.log_dir, e);
        tracing_subscriber::registry().with(console_layer).init();
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(env_filter(&directives));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::info!(
        log_dir = ?config.log_dir,
        max_files = config.max_files,
        "File logging enabled"
    );

    let log_dir = config.log_dir.clone();
    let max_files = config.max_files;
    std::thread::spawn(move || {
        cleanup_old_logs(&log_dir, max_files);
    });

    Some(guard)
}

/// Keep only the `max_files` most recently modified log files.
fn cleanup_old_logs(log_dir: &Path, max_files: usize) {
    let entries = match std::fs::read_dir(log_dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };

    let mut log_files: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_name()
                .to_str()
                .is_some_and(|n| n.starts_with(LOG_FILE_PREFIX))
        })
        .filter_map(|e| {
            e.metadata()
                .ok()
                .and_then(|m| m.modified().ok())
                .map(|t| (e.path(), t))
        })
        .collect();

    log_files.sort_by(|a, b| b.1.cmp(&a.1));

    for (path, _) in log_files.into_iter().skip(max_files) {
        if let Err(e) = std::fs::remove_file(&path) {
            tracing::warn!("Failed to remove old log file {:?}: {}", path, e);
        } else {
            tracing::debug!("Removed old log file: {:?}", path);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{fs::File, time::Duration};

    use serial_test::serial;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_filter_directives() {
        let directives = filter_directives("debug");
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("server=debug"));
        assert!(directives.contains("db=debug"));

        assert_eq!(filter_directives("server=trace,warn"), "server=trace,warn");
    }

    #[test]
    fn test_cleanup_keeps_newest_log_files() {
        let temp_dir = TempDir::new().unwrap();
        let names = [
            "task-tiles.log.2025-06-01",
            "task-tiles.log.2025-06-02",
            "task-tiles.log.2025-06-03",
        ];
        for name in names {
            File::create(temp_dir.path().join(name)).unwrap();
            // Distinct modification times.
            std::thread::sleep(Duration::from_millis(20));
        }
        File::create(temp_dir.path().join("unrelated.txt")).unwrap();

        cleanup_old_logs(temp_dir.path(), 2);

        assert!(!temp_dir.path().join(names[0]).exists());
        assert!(temp_dir.path().join(names[1]).exists());
        assert!(temp_dir.path().join(names[2]).exists());
        assert!(temp_dir.path().join("unrelated.txt").exists());
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        // SAFETY: serialized with other env-mutating tests
        unsafe {
            std::env::set_var("TILES_FILE_LOGGING", "1");
            std::env::set_var("TILES_LOG_DIR", "/tmp/tiles-logs");
            std::env::set_var("TILES_LOG_MAX_FILES", "0");
        }
        let config = FileLoggingConfig::default();
        unsafe {
            std::env::remove_var("TILES_FILE_LOGGING");
            std::env::remove_var("TILES_LOG_DIR");
            std::env::remove_var("TILES_LOG_MAX_FILES");
        }

        assert!(config.enabled);
        assert_eq!(config.log_dir, PathBuf::from("/tmp/tiles-logs"));
        assert_eq!(config.max_files, DEFAULT_MAX_FILES);
    }
}
