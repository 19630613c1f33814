//! The engine's text protocol.
//!
//! The engine is an interactive console program: it prints a prompt containing
//! [`READY_MARKER`] whenever it can take a query, and leaves its loop when it
//! reads [`EXIT_COMMAND`]. Everything else it prints is free text.

/// Printed by the engine once the backend connection is up.
pub const READY_MARKER: &str = "Enter your query";

/// Input line that makes the engine leave its interactive loop.
pub const EXIT_COMMAND: &str = "exit";

/// Stdin script for a connect probe: leave immediately.
pub fn connect_script() -> String {
    format!("{EXIT_COMMAND}\n")
}

/// Stdin script for a query: the query line, then leave.
///
/// The engine reads one query per line, so each run of line breaks is folded
/// into a single space. All other characters are passed through untouched.
pub fn query_script(query: &str) -> String {
    let line = query
        .split(['\r', '\n'])
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    format!("{line}\n{EXIT_COMMAND}\n")
}

/// Connect succeeds if the engine exited cleanly or ever reached its prompt.
///
/// The exit code alone is unreliable, so the marker wins.
pub fn connect_accepted(exited_cleanly: bool, marker_seen: bool) -> bool {
    exited_cleanly || marker_seen
}

/// A query run is accepted if the engine exited cleanly or printed anything.
pub fn query_accepted(exited_cleanly: bool, transcript: &Transcript) -> bool {
    exited_cleanly || !transcript.is_empty()
}

/// Combined stdout and stderr of one engine invocation, one entry per line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    text: String,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one line (without its terminator).
    pub fn push_line(&mut self, line: &str) {
        self.text.push_str(line);
        self.text.push('\n');
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// True if the engine printed nothing at all.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of captured lines.
    pub fn line_count(&self) -> usize {
        self.text.lines().count()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.text.contains(needle)
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl From<&str> for Transcript {
    fn from(text: &str) -> Self {
        let mut transcript = Self::new();
        for line in text.lines() {
            transcript.push_line(line);
        }
        transcript
    }
}

/// When to stop reading engine output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCondition {
    /// Stop as soon as a line contains the marker.
    Marker(&'static str),
    /// Read until the engine closes its output.
    EndOfStream,
}

/// Reader state while collecting output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadState {
    AwaitingMarker,
    Ready,
}

/// Whether the read loop should keep going after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Line sink that records the transcript and tracks readiness.
#[derive(Debug)]
pub struct TranscriptCollector {
    stop: StopCondition,
    state: ReadState,
    transcript: Transcript,
}

impl TranscriptCollector {
    pub fn new(stop: StopCondition) -> Self {
        Self {
            stop,
            state: ReadState::AwaitingMarker,
            transcript: Transcript::new(),
        }
    }

    /// Records a line and reports whether reading should stop.
    pub fn push_line(&mut self, line: &str) -> Flow {
        self.transcript.push_line(line);

        if let StopCondition::Marker(marker) = self.stop {
            if self.state == ReadState::AwaitingMarker && line.contains(marker) {
                self.state = ReadState::Ready;
                return Flow::Stop;
            }
        }
        Flow::Continue
    }

    pub fn state(&self) -> ReadState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ReadState::Ready
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn into_transcript(self) -> Transcript {
        self.transcript
    }
}
