//! NL2SQL bridge - session manager and output parser for an NL→SQL engine.
//!
//! The engine is an external executable that is started once per operation:
//! a connect validates credentials, a query pipes one natural-language
//! request to it and captures the human-readable report it prints.
//! [`service::Nl2SqlService`] turns that report into structured outcomes.

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod outcome;
pub mod parser;
pub mod service;
pub mod session;

pub use error::{BridgeError, Result};
pub use outcome::{ConnectionInfo, ConnectionOutcome, QueryOutcome, ResultRow, StatusReport};
pub use service::Nl2SqlService;
pub use session::{ConnectionProfile, SessionManager};
