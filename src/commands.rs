//! Line commands for the interactive session.
//!
//! Lines starting with `/` are commands; any other non-blank line is a
//! natural-language query passed to the engine verbatim. A query that itself
//! starts with `/` is written with a doubled slash.

use crate::config::default_port;
use crate::session::ConnectionProfile;

/// Usage text printed by `/help` and on malformed commands.
pub const HELP_TEXT: &str = "Commands: /connect [NAME | HOST USER PASSWORD DATABASE [PORT]], /status, /help, /exit. Any other line is sent to the engine as a query; start it with // to send a query beginning with /.";

/// Which connection a `/connect` refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectTarget {
    /// The connection resolved from CLI flags, config and environment.
    Default,
    /// A named connection from the config file.
    Named(String),
    /// A profile given inline.
    Explicit(ConnectionProfile),
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Connect(ConnectTarget),
    Status,
    Help,
    Exit,
    Query(String),
    Empty,
}

impl SessionCommand {
    /// Parses one input line.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Self::Empty);
        }
        if let Some(query) = line.strip_prefix("//") {
            return Ok(Self::Query(format!("/{query}")));
        }
        let Some(command) = line.strip_prefix('/') else {
            return Ok(Self::Query(line.to_string()));
        };

        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default().to_lowercase();
        let args: Vec<&str> = parts.collect();

        match name.as_str() {
            "connect" | "conn" => parse_connect(&args).map(Self::Connect),
            "status" => Ok(Self::Status),
            "help" | "?" => Ok(Self::Help),
            "exit" | "quit" | "q" => Ok(Self::Exit),
            other => Err(format!("Unknown command: /{other}. {HELP_TEXT}")),
        }
    }
}

fn parse_connect(args: &[&str]) -> Result<ConnectTarget, String> {
    match args {
        [] => Ok(ConnectTarget::Default),
        [name] => Ok(ConnectTarget::Named((*name).to_string())),
        [host, user, password, database] => Ok(ConnectTarget::Explicit(ConnectionProfile::new(
            *host,
            *user,
            *password,
            *database,
            default_port(),
        ))),
        [host, user, password, database, port] => {
            let port = port
                .parse::<u16>()
                .map_err(|_| format!("Invalid port: '{port}'"))?;
            Ok(ConnectTarget::Explicit(ConnectionProfile::new(
                *host, *user, *password, *database, port,
            )))
        }
        _ => Err("Usage: /connect [NAME | HOST USER PASSWORD DATABASE [PORT]]".to_string()),
    }
}
