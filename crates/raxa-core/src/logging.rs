//! Logging configuration
//!
//! Only the settings live here; the subscriber is installed by the binary.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

const LOG_FILE_PREFIX: &str = "raxa_";
const LOG_FILE_EXTENSION: &str = "log";

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default level (`error`, `warn`, `info`, `debug`, `trace`); `RUST_LOG` overrides it
    pub level: String,
    /// Directory for log files
    pub log_dir: PathBuf,
    /// Number of log files kept on disk
    pub max_files: usize,
    /// Write to stderr
    pub console_output: bool,
    /// Write to a file in `log_dir`
    pub file_output: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: default_log_dir(),
            max_files: 7,
            console_output: true,
            file_output: false,
        }
    }
}

impl LogConfig {
    /// Parse the configured level, falling back to INFO
    pub fn parse_level(&self) -> LevelFilter {
        self.level.parse().unwrap_or(LevelFilter::INFO)
    }

    /// Create the log directory if needed
    pub fn ensure_log_directory(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.log_dir)
    }

    /// Path of today's log file
    pub fn current_log_path(&self) -> PathBuf {
        let date = chrono::Local::now().format("%Y-%m-%d");
        self.log_dir
            .join(format!("{}{}.{}", LOG_FILE_PREFIX, date, LOG_FILE_EXTENSION))
    }

    /// Delete the oldest log files so that at most `max_files` remain.
    ///
    /// Returns the number of files removed.
    pub fn cleanup_old_logs(&self) -> std::io::Result<usize> {
        if !self.log_dir.exists() {
            return Ok(0);
        }

        let mut logs: Vec<PathBuf> = std::fs::read_dir(&self.log_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_log_file(path))
            .collect();

        if logs.len() <= self.max_files {
            return Ok(0);
        }

        // Date-stamped names sort chronologically
        logs.sort();
        let excess = logs.len() - self.max_files;
        for path in &logs[..excess] {
            std::fs::remove_file(path)?;
        }
        Ok(excess)
    }
}

fn is_log_file(path: &std::path::Path) -> bool {
    let has_prefix = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(LOG_FILE_PREFIX));
    has_prefix && path.extension().is_some_and(|e| e == LOG_FILE_EXTENSION)
}

fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("raxa").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        let mut config = LogConfig::default();
        assert_eq!(config.parse_level(), LevelFilter::INFO);

        config.level = "debug".to_string();
        assert_eq!(config.parse_level(), LevelFilter::DEBUG);

        config.level = "loud".to_string();
        assert_eq!(config.parse_level(), LevelFilter::INFO);
    }

    #[test]
    fn test_cleanup_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        let config = LogConfig {
            log_dir: dir.path().to_path_buf(),
            max_files: 2,
            ..Default::default()
        };

        for day in ["2024-01-01", "2024-01-02", "2024-01-03"] {
            std::fs::write(dir.path().join(format!("raxa_{}.log", day)), b"").unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();

        assert_eq!(config.cleanup_old_logs().unwrap(), 1);
        assert!(!dir.path().join("raxa_2024-01-01.log").exists());
        assert!(dir.path().join("raxa_2024-01-03.log").exists());
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_current_log_path_is_in_dir() {
        let config = LogConfig::default();
        let path = config.current_log_path();
        assert!(path.starts_with(&config.log_dir));
        assert!(is_log_file(&path));
    }
}
