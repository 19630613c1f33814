//! Session manager: engine lifecycle and the current connection.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use super::process::{ChildProcessRunner, Invocation, ProcessRunner};
use super::profile::ConnectionProfile;
use super::protocol::{
    connect_accepted, connect_script, query_accepted, query_script, StopCondition, Transcript,
    READY_MARKER,
};
use crate::error::{BridgeError, Operation, Result};
use crate::outcome::StatusReport;

/// Drives the engine executable and holds the single current connection.
///
/// Every connect and every query spawns a fresh engine process. The only
/// state carried between calls is the stored [`ConnectionProfile`], which is
/// replaced as a whole by a successful connect and read as an `Arc` snapshot.
pub struct SessionManager {
    executable: PathBuf,
    timeout: Duration,
    runner: Arc<dyn ProcessRunner>,
    current: RwLock<Option<Arc<ConnectionProfile>>>,
}

impl SessionManager {
    /// Creates a session manager that spawns real engine processes.
    pub fn new(executable: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self::with_runner(executable, timeout, Arc::new(ChildProcessRunner::new()))
    }

    /// Creates a session manager with a custom process runner.
    pub fn with_runner(
        executable: impl Into<PathBuf>,
        timeout: Duration,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        Self {
            executable: absolute(executable.into()),
            timeout,
            runner,
            current: RwLock::new(None),
        }
    }

    /// The configured engine executable.
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Whether the engine executable currently exists on disk.
    pub fn executable_found(&self) -> bool {
        self.executable.exists()
    }

    /// Snapshot of the current connection, if any.
    pub fn current_profile(&self) -> Option<Arc<ConnectionProfile>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Check if there's an active connection.
    pub fn is_connected(&self) -> bool {
        self.current_profile().is_some()
    }

    /// Reports connection and executable state. Never spawns anything.
    pub fn status(&self) -> StatusReport {
        let profile = self.current_profile();
        StatusReport {
            connected: profile.is_some(),
            connection_info: profile.map(|p| p.info()),
            executable_found: self.executable_found(),
        }
    }

    /// Validates a profile by starting the engine with it and waiting for its
    /// prompt. On success the profile becomes the current connection and a
    /// confirmation message is returned; on failure the previous connection
    /// is kept.
    pub async fn connect(&self, profile: ConnectionProfile) -> Result<String> {
        self.ensure_executable()?;

        tracing::info!(
            connection = %profile.display_string(),
            "Validating connection with engine"
        );

        let invocation = self.invocation(
            Operation::Connect,
            &profile,
            connect_script(),
            StopCondition::Marker(READY_MARKER),
        );
        let output = self.runner.run(&invocation).await?;

        if !connect_accepted(output.exited_cleanly(), output.marker_seen) {
            tracing::warn!(
                exit_code = ?output.exit_code,
                lines = output.transcript.line_count(),
                "Engine rejected connection"
            );
            return Err(BridgeError::connection_rejected(
                output.transcript.into_string(),
            ));
        }

        let message = format!(
            "Connected to {} on {}",
            profile.database(),
            profile.host()
        );
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(profile));
        tracing::info!("{message}");

        Ok(message)
    }

    /// Runs a natural-language query through a fresh engine process using
    /// the current connection and returns the raw transcript.
    pub async fn query(&self, text: &str) -> Result<Transcript> {
        let profile = self.current_profile().ok_or(BridgeError::NotConnected)?;
        self.ensure_executable()?;

        tracing::debug!(
            connection = %profile.display_string(),
            query_len = text.len(),
            "Running query through engine"
        );

        let invocation = self.invocation(
            Operation::Query,
            &profile,
            query_script(text),
            StopCondition::EndOfStream,
        );
        let output = self.runner.run(&invocation).await?;

        if !query_accepted(output.exited_cleanly(), &output.transcript) {
            tracing::warn!(exit_code = ?output.exit_code, "Engine produced no output");
            return Err(BridgeError::execution_failed(output.transcript.into_string()));
        }

        Ok(output.transcript)
    }

    fn ensure_executable(&self) -> Result<()> {
        if self.executable_found() {
            Ok(())
        } else {
            tracing::error!(path = %self.executable.display(), "Engine executable not found");
            Err(BridgeError::executable_not_found(&self.executable))
        }
    }

    fn invocation(
        &self,
        operation: Operation,
        profile: &ConnectionProfile,
        script: String,
        stop: StopCondition,
    ) -> Invocation {
        Invocation {
            operation,
            program: self.executable.clone(),
            args: profile.startup_args(),
            working_dir: self
                .executable
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
            script,
            stop,
            deadline: self.timeout,
        }
    }
}

/// Resolves a relative executable path against the current directory so the
/// engine can be started with its own directory as working directory.
fn absolute(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path,
    }
}
