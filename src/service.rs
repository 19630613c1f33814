//! Upstream-facing NL→SQL operations.
//!
//! `Nl2SqlService` is the single entry point used by every front end. It
//! composes the [`SessionManager`] with the output parser and folds every
//! failure into a structured outcome, so callers only ever see a `success`
//! flag and a message.

use std::time::Instant;

use crate::error::BridgeError;
use crate::outcome::{ConnectionOutcome, QueryOutcome, StatusReport};
use crate::parser::parse_transcript;
use crate::session::{ConnectionProfile, SessionManager};

/// NL→SQL service backed by the engine executable.
pub struct Nl2SqlService {
    session: SessionManager,
}

impl Nl2SqlService {
    /// Creates a new service around a session manager.
    pub fn new(session: SessionManager) -> Self {
        Self { session }
    }

    /// The underlying session manager.
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Validates and stores a connection.
    pub async fn connect(&self, profile: ConnectionProfile) -> ConnectionOutcome {
        match self.session.connect(profile).await {
            Ok(message) => ConnectionOutcome::accepted(message),
            Err(e) => {
                log_failure(&e);
                ConnectionOutcome::failed(e.to_string())
            }
        }
    }

    /// Runs a natural-language query against the current connection.
    pub async fn execute_query(&self, query: &str) -> QueryOutcome {
        let start = Instant::now();

        let transcript = match self.session.query(query).await {
            Ok(transcript) => transcript,
            Err(e) => {
                log_failure(&e);
                return QueryOutcome::failed(e.to_string());
            }
        };

        let outcome = parse_transcript(transcript.as_str());

        tracing::debug!(
            duration_ms = start.elapsed().as_millis(),
            transcript_lines = transcript.line_count(),
            rows = outcome.result_rows.len(),
            rows_returned = outcome.rows_returned,
            has_sql = outcome.generated_sql.is_some(),
            "Parsed engine output"
        );
        if outcome.is_blank() {
            tracing::warn!("Engine output contained no recognised fields");
        }

        outcome
    }

    /// Reports connection and executable state.
    pub fn status(&self) -> StatusReport {
        self.session.status()
    }
}

fn log_failure(err: &BridgeError) {
    match err {
        BridgeError::NotConnected => tracing::info!("{err}"),
        _ => tracing::error!(category = err.category(), "{err}"),
    }
}
