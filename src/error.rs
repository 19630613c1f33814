//! Error types for the NL2SQL bridge.
//!
//! Defines the main error enum used throughout the crate. Every variant is
//! eventually folded into a structured outcome by the service layer, so the
//! `Display` text doubles as the user-visible message.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// The engine operation an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Establishing (validating) a connection.
    Connect,
    /// Running a natural-language query.
    Query,
}

impl Operation {
    /// Returns the label used as the prefix of process error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Connect => "Connection",
            Self::Query => "Query execution",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Main error type for bridge operations.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The configured engine executable does not exist on disk.
    #[error("nl2sql executable not found at {}", .0.display())]
    ExecutableNotFound(PathBuf),

    /// The engine ran but never became ready and exited non-zero.
    #[error("Connection failed: {transcript}")]
    ConnectionRejected { transcript: String },

    /// A query was attempted before any successful connect.
    #[error("No active connection.")]
    NotConnected,

    /// The engine produced no output and exited non-zero.
    #[error("Query execution failed: {transcript}")]
    ExecutionFailed { transcript: String },

    /// Spawning or talking to the child process failed.
    #[error("{operation} error: {message}")]
    Process {
        operation: Operation,
        message: String,
    },

    /// The child process did not finish before its deadline and was killed.
    #[error("{operation} timed out after {}s", .after.as_secs_f64())]
    Timeout {
        operation: Operation,
        after: Duration,
    },

    /// Configuration errors (invalid config file, missing required fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Creates an executable-not-found error for the given path.
    pub fn executable_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ExecutableNotFound(path.into())
    }

    /// Creates a connection-rejected error carrying the engine transcript.
    pub fn connection_rejected(transcript: impl Into<String>) -> Self {
        Self::ConnectionRejected {
            transcript: transcript.into(),
        }
    }

    /// Creates an execution-failed error carrying the engine transcript.
    pub fn execution_failed(transcript: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            transcript: transcript.into(),
        }
    }

    /// Wraps an I/O failure that happened while driving the child process.
    pub fn process(operation: Operation, err: impl std::fmt::Display) -> Self {
        Self::Process {
            operation,
            message: err.to_string(),
        }
    }

    /// Creates a timeout error.
    pub fn timeout(operation: Operation, after: Duration) -> Self {
        Self::Timeout { operation, after }
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::ExecutableNotFound(_) => "Executable Not Found",
            Self::ConnectionRejected { .. } => "Connection Error",
            Self::NotConnected => "Not Connected",
            Self::ExecutionFailed { .. } => "Query Error",
            Self::Process { .. } => "Process Error",
            Self::Timeout { .. } => "Timeout",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using BridgeError.
pub type Result<T> = std::result::Result<T, BridgeError>;
