//! Connection profile handed to the engine on every invocation.

use crate::outcome::ConnectionInfo;

/// The five values the engine takes as positional startup arguments.
///
/// Profiles are immutable; a new connect replaces the whole profile.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionProfile {
    host: String,
    user: String,
    password: String,
    database: String,
    port: u16,
}

impl ConnectionProfile {
    /// Creates a new profile.
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            password: password.into(),
            database: database.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Positional arguments in the order the engine expects:
    /// `host user password database port`.
    pub fn startup_args(&self) -> Vec<String> {
        vec![
            self.host.clone(),
            self.user.clone(),
            self.password.clone(),
            self.database.clone(),
            self.port.to_string(),
        ]
    }

    /// Non-secret connection metadata.
    pub fn info(&self) -> ConnectionInfo {
        ConnectionInfo {
            host: self.host.clone(),
            database: self.database.clone(),
            user: self.user.clone(),
        }
    }

    /// Returns a display-safe string (no password) for logs.
    pub fn display_string(&self) -> String {
        format!("{}@{}:{}/{}", self.user, self.host, self.port, self.database)
    }
}

impl std::fmt::Debug for ConnectionProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionProfile")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("port", &self.port)
            .finish()
    }
}
