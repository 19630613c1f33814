//! Interactive session loop and connection resolution.
//!
//! Reads one command or query per input line and writes one JSON document per
//! response line.

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::commands::{ConnectTarget, SessionCommand, HELP_TEXT};
use crate::config::{Config, ConnectionSettings};
use crate::error::{BridgeError, Result};
use crate::outcome::{ConnectionOutcome, QueryOutcome, StatusReport};
use crate::service::Nl2SqlService;
use crate::session::ConnectionProfile;

/// A single response written to the output stream.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Response {
    Connection(ConnectionOutcome),
    Query(QueryOutcome),
    Status(StatusReport),
    Notice { success: bool, message: String },
}

impl Response {
    fn notice(success: bool, message: impl Into<String>) -> Self {
        Self::Notice {
            success,
            message: message.into(),
        }
    }
}

/// Ties the service to configuration and command-line connection settings.
pub struct App {
    service: Nl2SqlService,
    config: Config,
    cli_settings: ConnectionSettings,
    default_connection: Option<String>,
}

impl App {
    /// Creates a new app.
    ///
    /// `default_connection` names the config entry used by a bare `/connect`;
    /// `None` means the entry called `default`.
    pub fn new(
        service: Nl2SqlService,
        config: Config,
        cli_settings: ConnectionSettings,
        default_connection: Option<String>,
    ) -> Self {
        Self {
            service,
            config,
            cli_settings,
            default_connection,
        }
    }

    pub fn service(&self) -> &Nl2SqlService {
        &self.service
    }

    /// Resolves connection settings with precedence:
    /// 1. Command-line arguments (highest)
    /// 2. Named (or default) connection from config
    /// 3. Environment variables
    pub fn resolve_settings(&self, name: Option<&str>) -> Result<ConnectionSettings> {
        let mut settings = match name {
            Some(name) => self.config.get_connection(Some(name)).cloned().ok_or_else(|| {
                BridgeError::config(format!("Connection '{name}' not found in config file"))
            })?,
            None => self.config.get_connection(None).cloned().unwrap_or_default(),
        };

        settings.merge(&self.cli_settings);
        settings.apply_env_defaults();

        Ok(settings)
    }

    /// Resolves the profile a `/connect` command refers to.
    pub fn resolve_profile(&self, target: ConnectTarget) -> Result<ConnectionProfile> {
        match target {
            ConnectTarget::Explicit(profile) => Ok(profile),
            ConnectTarget::Named(name) => self.resolve_settings(Some(&name))?.to_profile(),
            ConnectTarget::Default => self
                .resolve_settings(self.default_connection.as_deref())?
                .to_profile(),
        }
    }

    /// Connects using the default target, then runs one query.
    ///
    /// A failed connect is reported as a failed query outcome.
    pub async fn run_once(&self, query: &str) -> QueryOutcome {
        let profile = match self.resolve_profile(ConnectTarget::Default) {
            Ok(profile) => profile,
            Err(e) => return QueryOutcome::failed(e.to_string()),
        };

        let connected = self.service.connect(profile).await;
        if !connected.success {
            return QueryOutcome::failed(connected.message);
        }

        self.service.execute_query(query).await
    }

    /// Handles one parsed command. Returns `None` for `/exit` and blank lines.
    pub async fn handle(&self, command: SessionCommand) -> Option<Response> {
        let response = match command {
            SessionCommand::Empty | SessionCommand::Exit => return None,
            SessionCommand::Help => Response::notice(true, HELP_TEXT),
            SessionCommand::Status => Response::Status(self.service.status()),
            SessionCommand::Connect(target) => match self.resolve_profile(target) {
                Ok(profile) => Response::Connection(self.service.connect(profile).await),
                Err(e) => Response::Connection(ConnectionOutcome::failed(e.to_string())),
            },
            SessionCommand::Query(text) => Response::Query(self.service.execute_query(&text).await),
        };
        Some(response)
    }

    /// Runs the session until `/exit` or end of input.
    pub async fn run<R, W>(&self, input: R, mut output: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();

        while let Some(line) = lines.next_line().await? {
            let response = match SessionCommand::parse(&line) {
                Ok(SessionCommand::Exit) => break,
                Ok(command) => self.handle(command).await,
                Err(message) => Some(Response::notice(false, message)),
            };

            if let Some(response) = response {
                let json = serde_json::to_string(&response)?;
                output.write_all(json.as_bytes()).await?;
                output.write_all(b"\n").await?;
                output.flush().await?;
            }
        }

        tracing::debug!("Session input closed");
        Ok(())
    }
}
