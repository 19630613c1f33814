//! Logging configuration for the NL2SQL bridge.
//!
//! Stdout carries JSON outcomes only, so logs go to stderr by default, or to a
//! file when the caller wants stderr left clean as well.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Where log output is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// The file returned by [`log_path`].
    File,
}

impl LogTarget {
    pub fn from_flag(log_file: bool) -> Self {
        if log_file {
            Self::File
        } else {
            Self::Stderr
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the `info` default.
///
/// Returns the log file path when logging to a file. If the file cannot be
/// created the bridge falls back to stderr and says so there.
pub fn init(target: LogTarget) -> Option<PathBuf> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if target == LogTarget::File {
        let path = log_path();
        match open_log_file(&path) {
            Ok(file) => {
                builder.with_writer(file).with_ansi(false).init();
                return Some(path);
            }
            Err(e) => eprintln!("Warning: Could not open log file {}: {e}", path.display()),
        }
    }

    builder.with_writer(std::io::stderr).init();
    None
}

// Truncated on each run
fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    File::create(path)
}

/// Returns the path for the log file.
///
/// `~/.local/state/nl2sql-bridge/nl2sql-bridge.log` on Linux, the config
/// directory where there is no state directory, the temp directory otherwise.
pub fn log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        return state_dir.join("nl2sql-bridge").join("nl2sql-bridge.log");
    }

    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("nl2sql-bridge").join("nl2sql-bridge.log");
    }

    std::env::temp_dir().join("nl2sql-bridge.log")
}
