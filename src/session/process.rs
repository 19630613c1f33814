//! Child process execution.
//!
//! [`ProcessRunner`] is the seam between the session logic and the operating
//! system. [`ChildProcessRunner`] spawns the engine with tokio, writes the
//! stdin script, drains stdout and stderr into one transcript, and enforces
//! the invocation deadline by killing the child.

use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::time::{timeout_at, Instant};

use super::protocol::{Flow, StopCondition, Transcript, TranscriptCollector};
use crate::error::{BridgeError, Operation, Result};

/// Everything needed to run the engine once.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub operation: Operation,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    /// Text written to stdin before reading begins.
    pub script: String,
    pub stop: StopCondition,
    pub deadline: Duration,
}

/// What an engine run produced.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub transcript: Transcript,
    /// `None` if the process was killed or terminated by a signal.
    pub exit_code: Option<i32>,
    /// True if the stop marker was seen before reading ended.
    pub marker_seen: bool,
}

impl ProcessOutput {
    pub fn exited_cleanly(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs one scripted exchange with a child process.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> Result<ProcessOutput>;
}

/// Runs the engine as a real child process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChildProcessRunner;

impl ChildProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessRunner for ChildProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ProcessOutput> {
        let op = invocation.operation;
        let deadline = Instant::now() + invocation.deadline;

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| BridgeError::process(op, e))?;

        tracing::debug!(
            pid = ?child.id(),
            program = %invocation.program.display(),
            operation = %op,
            "Spawned engine process"
        );

        let (Some(stdin), Some(stdout), Some(stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            return Err(BridgeError::internal("engine stdio was not piped"));
        };

        let mut collector = TranscriptCollector::new(invocation.stop);
        let sink = &mut collector;
        let script = invocation.script.as_str();
        let exchange = async move {
            write_script(stdin, script).await?;
            read_combined(stdout, stderr, sink).await
        };

        match timeout_at(deadline, exchange).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = child.kill().await;
                return Err(BridgeError::process(op, e));
            }
            Err(_) => {
                tracing::warn!(
                    operation = %op,
                    captured_lines = collector.transcript().line_count(),
                    "Engine output not finished before deadline, killing process"
                );
                let _ = child.kill().await;
                return Err(BridgeError::timeout(op, invocation.deadline));
            }
        }

        let marker_seen = collector.is_ready();
        let exit_code = match timeout_at(deadline, child.wait()).await {
            Ok(status) => status.map_err(|e| BridgeError::process(op, e))?.code(),
            Err(_) if marker_seen => {
                tracing::debug!("Engine reached its prompt but did not exit in time, killing it");
                let _ = child.kill().await;
                None
            }
            Err(_) => {
                tracing::warn!(operation = %op, "Engine did not exit before deadline, killing process");
                let _ = child.kill().await;
                return Err(BridgeError::timeout(op, invocation.deadline));
            }
        };

        tracing::debug!(
            operation = %op,
            ?exit_code,
            marker_seen,
            "Engine process finished"
        );

        Ok(ProcessOutput {
            transcript: collector.into_transcript(),
            exit_code,
            marker_seen,
        })
    }
}

/// Writes the script and closes stdin so the engine sees end-of-input.
///
/// An engine that exits before reading its input closes the pipe; that is not
/// an error here, its output explains what happened.
async fn write_script(mut stdin: ChildStdin, script: &str) -> io::Result<()> {
    let written = async {
        stdin.write_all(script.as_bytes()).await?;
        stdin.flush().await
    }
    .await;

    match written {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            tracing::debug!("Engine closed stdin before reading the script");
            Ok(())
        }
        other => other,
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Reads stdout and stderr line by line into one transcript, in arrival order,
/// until both close or the collector asks to stop.
///
/// Lines are decoded lossily: the engine is a console program whose data
/// cells may be in a legacy code page, and one bad byte must not cost the
/// whole report.
async fn read_combined(
    stdout: ChildStdout,
    stderr: ChildStderr,
    collector: &mut TranscriptCollector,
) -> io::Result<()> {
    let mut out = BufReader::new(stdout);
    let mut err = BufReader::new(stderr);
    // Kept across iterations: a read_until cancelled by select! leaves its
    // partial line here and the next call appends to it.
    let mut out_buf = Vec::new();
    let mut err_buf = Vec::new();
    let mut out_open = true;
    let mut err_open = true;

    while out_open || err_open {
        let (stream, read) = tokio::select! {
            read = out.read_until(b'\n', &mut out_buf), if out_open => (Stream::Stdout, read?),
            read = err.read_until(b'\n', &mut err_buf), if err_open => (Stream::Stderr, read?),
        };

        let (buf, open) = match stream {
            Stream::Stdout => (&mut out_buf, &mut out_open),
            Stream::Stderr => (&mut err_buf, &mut err_open),
        };

        if !buf.is_empty() {
            let line = decode_line(buf);
            buf.clear();
            if collector.push_line(&line) == Flow::Stop {
                break;
            }
        }
        if read == 0 {
            *open = false;
        }
    }

    Ok(())
}

/// Decodes one raw output line, dropping its `\n` or `\r\n` ending.
/// Invalid UTF-8 becomes U+FFFD.
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}
