//! Mock process runner for testing.
//!
//! Plays back canned engine output instead of spawning anything, and records
//! every invocation so tests can inspect arguments and stdin scripts.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::process::{Invocation, ProcessOutput, ProcessRunner};
use super::protocol::{Flow, TranscriptCollector, EXIT_COMMAND, READY_MARKER};
use crate::error::{BridgeError, Operation, Result};

/// A canned reaction to one invocation.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// The engine prints these lines and exits with the given code.
    Output {
        lines: Vec<String>,
        exit_code: Option<i32>,
    },
    /// Spawning or piping fails with this message.
    IoError(String),
    /// The engine hangs past its deadline.
    Hang,
}

impl MockResponse {
    /// Output lines with a given exit code.
    pub fn output<I, S>(lines: I, exit_code: i32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Output {
            lines: lines.into_iter().map(Into::into).collect(),
            exit_code: Some(exit_code),
        }
    }
}

/// A process runner that returns scripted responses.
///
/// Queued responses are used first, in order. Once the queue is empty the
/// runner behaves like a healthy engine: it accepts every connect and answers
/// every query with a small fixed report.
#[derive(Debug, Default)]
pub struct MockProcessRunner {
    queued: Mutex<VecDeque<MockResponse>>,
    invocations: Mutex<Vec<Invocation>>,
}

impl MockProcessRunner {
    /// Creates a mock that behaves like a healthy engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response for the next unanswered invocation.
    pub fn with_response(self, response: MockResponse) -> Self {
        self.lock_queue().push_back(response);
        self
    }

    /// Returns a copy of every invocation seen so far.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Number of times the runner was asked to spawn the engine.
    pub fn spawn_count(&self) -> usize {
        self.invocations.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    fn lock_queue(&self) -> std::sync::MutexGuard<'_, VecDeque<MockResponse>> {
        self.queued
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn default_response(invocation: &Invocation) -> MockResponse {
        let prompt = format!("{READY_MARKER} (type '{EXIT_COMMAND}' to quit):");
        match invocation.operation {
            Operation::Connect => MockResponse::output(
                [
                    "Connected to MySQL server.".to_string(),
                    prompt,
                    "Goodbye!".to_string(),
                ],
                0,
            ),
            Operation::Query => {
                let query = invocation.script.lines().next().unwrap_or_default();
                MockResponse::output(
                    [
                        "Connected to MySQL server.".to_string(),
                        prompt.clone(),
                        format!("Original Query: {query}"),
                        "Detected Intent: select".to_string(),
                        "Base Table: users".to_string(),
                        "Select Columns: id, name".to_string(),
                        "Where Conditions:".to_string(),
                        "Generated SQL: SELECT id, name FROM users".to_string(),
                        "2 rows returned".to_string(),
                        "id | name".to_string(),
                        "---|-----".to_string(),
                        "1 | Ada".to_string(),
                        "2 | Grace".to_string(),
                        "Execution time: 0.001 seconds".to_string(),
                        prompt,
                        "Goodbye!".to_string(),
                    ],
                    0,
                )
            }
        }
    }
}

#[async_trait]
impl ProcessRunner for MockProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ProcessOutput> {
        if let Ok(mut seen) = self.invocations.lock() {
            seen.push(invocation.clone());
        }

        let response = self
            .lock_queue()
            .pop_front()
            .unwrap_or_else(|| Self::default_response(invocation));

        match response {
            MockResponse::Output { lines, exit_code } => {
                let mut collector = TranscriptCollector::new(invocation.stop);
                for line in &lines {
                    if collector.push_line(line) == Flow::Stop {
                        break;
                    }
                }
                let marker_seen = collector.is_ready();
                Ok(ProcessOutput {
                    transcript: collector.into_transcript(),
                    exit_code,
                    marker_seen,
                })
            }
            MockResponse::IoError(message) => {
                Err(BridgeError::process(invocation.operation, message))
            }
            MockResponse::Hang => {
                tokio::time::sleep(invocation.deadline.min(Duration::from_millis(10))).await;
                Err(BridgeError::timeout(invocation.operation, invocation.deadline))
            }
        }
    }
}
