//! Session management for the NL2SQL engine.
//!
//! Owns the engine process lifecycle: spawning, the scripted stdin exchange,
//! transcript capture, deadlines, and the single current connection.

pub mod manager;
pub mod mock;
pub mod process;
pub mod profile;
pub mod protocol;

pub use manager::SessionManager;
pub use mock::{MockProcessRunner, MockResponse};
pub use process::{ChildProcessRunner, Invocation, ProcessOutput, ProcessRunner};
pub use profile::ConnectionProfile;
pub use protocol::{
    connect_accepted, query_accepted, Flow, ReadState, StopCondition, Transcript,
    TranscriptCollector, EXIT_COMMAND, READY_MARKER,
};
